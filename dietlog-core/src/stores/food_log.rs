//! The daily food log.
//!
//! Holds today's food entries, persists them under [`FOODS_KEY`] and clears
//! them once per calendar day.

use chrono::Utc;
use serde_json::Value;

use crate::clock::Clock;
use crate::models::{generate_entry_id, FoodEntry, MacroTotals, MealType, NewFoodEntry};
use crate::storage::{KeyValueStore, FOODS_KEY, LAST_RESET_KEY};

/// Date format of the last-reset marker.
const MARKER_FORMAT: &str = "%Y-%m-%d";

/// Today's food entries, in the order they were added.
///
/// Call [`FoodLogStore::activate`] once after construction; it loads the
/// persisted log and runs the daily reset check. Call
/// [`FoodLogStore::handle_foreground`] whenever the application comes back
/// to the foreground.
///
/// No operation returns an error: storage and parse failures are logged
/// and the store falls back to an empty log.
pub struct FoodLogStore<S, C> {
    storage: S,
    clock: C,
    foods: Vec<FoodEntry>,
    loading: bool,
}

impl<S: KeyValueStore, C: Clock> FoodLogStore<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            foods: Vec::new(),
            loading: true,
        }
    }

    /// Loads the persisted log, then checks for a new calendar day.
    pub fn activate(&mut self) {
        self.initialize();
        self.check_daily_reset();
    }

    /// Re-runs the daily reset check. Returns true if the log was cleared.
    pub fn handle_foreground(&mut self) -> bool {
        self.check_daily_reset()
    }

    /// Loads the persisted log. Only the first call has any effect.
    ///
    /// Corrupted data (not a JSON array of entries) is replaced by an empty
    /// array, both in memory and in storage.
    pub fn initialize(&mut self) {
        if !self.loading {
            return;
        }
        self.foods = self.load();
        self.loading = false;
        tracing::debug!("Loaded {} food entr(ies)", self.foods.len());
    }

    fn load(&self) -> Vec<FoodEntry> {
        let saved = match self.storage.get(FOODS_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("Error loading foods from storage: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&saved) {
            Ok(value @ Value::Array(_)) => match serde_json::from_value::<Vec<FoodEntry>>(value) {
                Ok(foods) => foods,
                Err(e) => {
                    tracing::error!("Error parsing saved foods: {}", e);
                    self.overwrite_with_empty();
                    Vec::new()
                }
            },
            Ok(_) => {
                tracing::warn!("Invalid food data found - resetting to empty array");
                self.overwrite_with_empty();
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Error parsing saved foods: {}", e);
                self.overwrite_with_empty();
                Vec::new()
            }
        }
    }

    fn overwrite_with_empty(&self) {
        if let Err(e) = self.storage.set(FOODS_KEY, "[]") {
            tracing::error!("Error overwriting corrupted foods: {}", e);
        }
    }

    /// Returns true until the first load attempt has finished.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn foods(&self) -> &[FoodEntry] {
        &self.foods
    }

    /// Entries logged for one meal, in insertion order.
    pub fn foods_for(&self, meal_type: MealType) -> impl Iterator<Item = &FoodEntry> {
        self.foods.iter().filter(move |f| f.meal_type == meal_type)
    }

    /// Macro totals over the whole log, truncated to two decimals.
    pub fn totals(&self) -> MacroTotals {
        MacroTotals::from_entries(&self.foods)
    }

    /// Appends a food with a fresh id, stamped with the store's clock.
    ///
    /// The entry is not validated here; see [`NewFoodEntry::validate`].
    pub fn add_food(&mut self, food: NewFoodEntry) -> &FoodEntry {
        let created_at = self.clock.now().with_timezone(&Utc);
        let mut id = generate_entry_id(created_at);
        while self.foods.iter().any(|f| f.id == id) {
            id = generate_entry_id(created_at);
        }

        self.foods.push(food.into_entry(id, created_at));
        self.persist();

        let index = self.foods.len() - 1;
        &self.foods[index]
    }

    /// Removes the storage key and empties the log.
    pub fn reset_foods(&mut self) {
        if let Err(e) = self.storage.remove(FOODS_KEY) {
            tracing::error!("Error resetting foods: {}", e);
        }
        self.foods.clear();
    }

    /// Clears the log if the last-reset marker is not today's local date,
    /// then moves the marker to today. Returns true if the log was cleared.
    pub fn check_daily_reset(&mut self) -> bool {
        let today = self.clock.today().format(MARKER_FORMAT).to_string();

        let last_reset = match self.storage.get(LAST_RESET_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Error checking daily reset: {}", e);
                return false;
            }
        };

        if last_reset.as_deref().map(str::trim) == Some(today.as_str()) {
            return false;
        }

        tracing::info!(
            "New day {} (last reset: {}), clearing food log",
            today,
            last_reset.as_deref().unwrap_or("never")
        );
        self.reset_foods();
        if let Err(e) = self.storage.set(LAST_RESET_KEY, &today) {
            tracing::error!("Error saving last reset date: {}", e);
        }
        true
    }

    /// Writes the full log, unless the initial load has not finished.
    fn persist(&self) {
        if self.loading {
            return;
        }
        let json = match serde_json::to_string(&self.foods) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Error serializing foods: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(FOODS_KEY, &json) {
            tracing::error!("Error saving foods: {}", e);
        }
    }
}
