use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::food_entry::{check_amount, ValidationError};
use super::meal_type::MealType;

/// Number of days in the default meal plan window.
pub const WEEK_LENGTH: usize = 7;

/// A recipe or food line item within a meal slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
}

impl PlanItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        calories: f64,
        protein: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calories,
            protein,
        }
    }

    /// Creates an item for a recipe, scaling its per-serving nutrition by
    /// `quantity`.
    ///
    /// Every call gets a distinct id, so the same recipe can appear twice in
    /// one slot and still be removed one at a time.
    pub fn from_recipe(
        recipe_id: u64,
        name: impl Into<String>,
        calories: f64,
        protein: f64,
        quantity: f64,
    ) -> Self {
        Self::new(
            format!("recipe-{}-{}", recipe_id, short_id()),
            name,
            calories * quantity,
            protein * quantity,
        )
    }

    /// Creates an item for a food entered by hand.
    pub fn custom(name: impl Into<String>, calories: f64, protein: f64, quantity: f64) -> Self {
        Self::new(
            format!("food-{}", short_id()),
            name,
            calories * quantity,
            protein * quantity,
        )
    }

    /// Checks that calories and protein are finite and non-negative.
    /// Non-finite values cannot be stored; they serialize as `null`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_amount("calories", self.calories)?;
        check_amount("protein", self.protein)
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Parses a quantity multiplier. Anything that is not a positive finite
/// number counts as 1.
pub fn parse_quantity(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 1.0,
    }
}

/// One meal of a planned day.
///
/// The totals are derived from `items` and recomputed from scratch on
/// every change, including deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "MealSlotRecord")]
pub struct MealSlot {
    items: Vec<PlanItem>,
    total_calories: f64,
    total_protein: f64,
}

#[derive(Deserialize)]
struct MealSlotRecord {
    #[serde(default)]
    items: Vec<PlanItem>,
}

impl From<MealSlotRecord> for MealSlot {
    fn from(record: MealSlotRecord) -> Self {
        Self::with_items(record.items)
    }
}

impl MealSlot {
    pub fn with_items(items: Vec<PlanItem>) -> Self {
        let mut slot = Self {
            items,
            total_calories: 0.0,
            total_protein: 0.0,
        };
        slot.recompute_totals();
        slot
    }

    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn total_calories(&self) -> f64 {
        self.total_calories
    }

    pub fn total_protein(&self) -> f64 {
        self.total_protein
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an item and recomputes the totals.
    pub fn push(&mut self, item: PlanItem) {
        self.items.push(item);
        self.recompute_totals();
    }

    /// Removes every item with the given id and recomputes the totals.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let len_before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        self.recompute_totals();
        self.items.len() != len_before
    }

    fn recompute_totals(&mut self) {
        self.total_calories = self.items.iter().map(|item| item.calories).sum();
        self.total_protein = self.items.iter().map(|item| item.protein).sum();
    }
}

/// The four meal slots of a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: MealSlot,
    #[serde(default)]
    pub lunch: MealSlot,
    #[serde(default)]
    pub dinner: MealSlot,
    #[serde(default)]
    pub snacks: MealSlot,
}

impl Meals {
    pub fn slot(&self, meal_type: MealType) -> &MealSlot {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snacks => &self.snacks,
        }
    }

    pub fn slot_mut(&mut self, meal_type: MealType) -> &mut MealSlot {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snacks => &mut self.snacks,
        }
    }

    /// Slots paired with their meal type, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (MealType, &MealSlot)> {
        MealType::ALL.into_iter().map(move |mt| (mt, self.slot(mt)))
    }
}

/// The planned meals for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanDay {
    pub date: NaiveDate,
    pub meals: Meals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MealPlanDay {
    /// A day with four empty slots.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            meals: Meals::default(),
            notes: None,
        }
    }

    /// Seven consecutive empty days starting at `start`.
    pub fn week_starting(start: NaiveDate) -> Vec<Self> {
        (0..WEEK_LENGTH as i64)
            .map(|offset| Self::empty(start + chrono::Duration::days(offset)))
            .collect()
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn total_calories(&self) -> f64 {
        self.meals.iter().map(|(_, slot)| slot.total_calories()).sum()
    }

    pub fn total_protein(&self) -> f64 {
        self.meals.iter().map(|(_, slot)| slot.total_protein()).sum()
    }

    pub fn item_count(&self) -> usize {
        self.meals.iter().map(|(_, slot)| slot.items().len()).sum()
    }
}

impl fmt::Display for MealPlanDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.date.format("%A, %Y-%m-%d").to_string();
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;

        for (meal_type, slot) in self.meals.iter() {
            writeln!(
                f,
                "\n{} ({} cal, {}g protein)",
                meal_type.label(),
                slot.total_calories(),
                slot.total_protein()
            )?;
            if slot.is_empty() {
                writeln!(f, "  (no items)")?;
            }
            for item in slot.items() {
                writeln!(
                    f,
                    "  - {} [{}]: {} cal, {}g protein",
                    item.name, item.id, item.calories, item.protein
                )?;
            }
        }

        if let Some(notes) = &self.notes {
            writeln!(f, "\nNotes: {}", notes)?;
        }

        Ok(())
    }
}
