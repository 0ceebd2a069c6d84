//! The weekly meal plan.
//!
//! A collection of [`MealPlanDay`]s persisted under [`MEAL_PLANS_KEY`],
//! seeded with seven empty days starting today when nothing valid is
//! stored.

use chrono::NaiveDate;
use serde_json::Value;

use crate::clock::Clock;
use crate::models::{MealPlanDay, MealType, PlanItem};
use crate::storage::{KeyValueStore, MEAL_PLANS_KEY};

/// Planned days, in collection order.
///
/// Dates are unique within the collection. Like the food log, no operation
/// returns an error; failures are logged and the previous or default state
/// is kept.
pub struct MealPlanStore<S, C> {
    storage: S,
    clock: C,
    plans: Vec<MealPlanDay>,
    loading: bool,
}

impl<S: KeyValueStore, C: Clock> MealPlanStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            plans: Vec::new(),
            loading: true,
        }
    }

    /// Loads persisted plans, falling back to a fresh week.
    ///
    /// Stored entries without a string `date` or without `meals` are
    /// dropped. If no entry survives, the seed week is used instead.
    pub fn initialize(&mut self) {
        if !self.loading {
            return;
        }
        self.plans = match self.load() {
            Some(plans) if !plans.is_empty() => plans,
            _ => self.seed(),
        };
        self.loading = false;
        tracing::debug!("Loaded {} meal plan day(s)", self.plans.len());
    }

    fn seed(&self) -> Vec<MealPlanDay> {
        MealPlanDay::week_starting(self.clock.today())
    }

    fn load(&self) -> Option<Vec<MealPlanDay>> {
        let saved = match self.storage.get(MEAL_PLANS_KEY) {
            Ok(saved) => saved?,
            Err(e) => {
                tracing::error!("Error loading meal plans: {}", e);
                return None;
            }
        };

        let entries = match serde_json::from_str::<Value>(&saved) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!("Invalid meal plan data found - using default week");
                return None;
            }
            Err(e) => {
                tracing::error!("Error loading meal plans: {}", e);
                return None;
            }
        };

        let mut plans: Vec<MealPlanDay> = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().filter(is_plan_entry) {
            match serde_json::from_value::<MealPlanDay>(entry) {
                Ok(day) if plans.iter().any(|p| p.date == day.date) => {
                    tracing::warn!("Skipping duplicate meal plan for {}", day.date);
                }
                Ok(day) => plans.push(day),
                Err(e) => tracing::warn!("Skipping invalid meal plan entry: {}", e),
            }
        }
        Some(plans)
    }

    /// Returns true until the first load attempt has finished.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn plans(&self) -> &[MealPlanDay] {
        &self.plans
    }

    /// Returns the stored day for `date`, or a new empty day.
    ///
    /// A new day is not inserted; pass it to
    /// [`MealPlanStore::add_or_update_meal_plan`] to keep it.
    pub fn get_or_create_daily_plan(&self, date: NaiveDate) -> MealPlanDay {
        self.get_meal_plan_by_date(date)
            .cloned()
            .unwrap_or_else(|| MealPlanDay::empty(date))
    }

    pub fn get_meal_plan_by_date(&self, date: NaiveDate) -> Option<&MealPlanDay> {
        self.plans.iter().find(|p| p.date == date)
    }

    /// Replaces the day with the same date in place, or appends it.
    pub fn add_or_update_meal_plan(&mut self, plan: MealPlanDay) {
        match self.plans.iter_mut().find(|p| p.date == plan.date) {
            Some(existing) => *existing = plan,
            None => self.plans.push(plan),
        }
        self.persist();
    }

    /// Removes the day for `date`. Returns false if there was none.
    pub fn delete_meal_plan(&mut self, date: NaiveDate) -> bool {
        let len_before = self.plans.len();
        self.plans.retain(|p| p.date != date);
        if self.plans.len() == len_before {
            return false;
        }
        self.persist();
        true
    }

    /// Appends an item to one meal of `date`.
    ///
    /// Dates outside the collection get a new day, appended at the end.
    /// Items with negative or non-finite numbers are logged and dropped.
    pub fn add_item(&mut self, date: NaiveDate, meal_type: MealType, item: PlanItem) {
        if let Err(e) = item.validate() {
            tracing::error!(
                "Not adding '{}' to {} on {}: {}",
                item.name,
                meal_type,
                date,
                e
            );
            return;
        }
        let mut day = self.get_or_create_daily_plan(date);
        day.meals.slot_mut(meal_type).push(item);
        self.add_or_update_meal_plan(day);
    }

    /// Removes the item with `item_id` from one meal of `date`.
    ///
    /// Returns false if the day or the item does not exist.
    pub fn remove_item(&mut self, date: NaiveDate, meal_type: MealType, item_id: &str) -> bool {
        let removed = match self.plans.iter_mut().find(|p| p.date == date) {
            Some(day) => day.meals.slot_mut(meal_type).remove(item_id),
            None => false,
        };
        if removed {
            self.persist();
        }
        removed
    }

    /// Deletes the stored plans and starts over with a fresh week from
    /// today.
    pub fn clear_all(&mut self) {
        if let Err(e) = self.storage.remove(MEAL_PLANS_KEY) {
            tracing::error!("Failed to clear meal plans: {}", e);
        }
        self.plans = self.seed();
    }

    /// Writes all plans, unless the initial load has not finished.
    fn persist(&self) {
        if self.loading {
            return;
        }
        let json = match serde_json::to_string(&self.plans) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error serializing meal plans: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(MEAL_PLANS_KEY, &json) {
            tracing::error!("Error saving meal plans: {}", e);
        }
    }
}

fn is_plan_entry(entry: &Value) -> bool {
    let has_date = entry
        .get("date")
        .and_then(Value::as_str)
        .is_some_and(|d| !d.is_empty());
    let has_meals = entry.get("meals").is_some_and(|m| !m.is_null());
    has_date && has_meals
}
