use serde::Serialize;
use std::fmt;

use super::food_entry::FoodEntry;

/// Summed macros for a set of food entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub protein: f64,
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    /// Sums the entries, then truncates each total to two decimals.
    ///
    /// Non-finite values count as zero.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a FoodEntry>) -> Self {
        let mut totals = Self::default();
        for entry in entries {
            totals.protein += finite_or_zero(entry.protein);
            totals.calories += finite_or_zero(entry.calories);
            totals.carbs += finite_or_zero(entry.carbs);
            totals.fat += finite_or_zero(entry.fat);
        }
        Self {
            protein: truncate_to_two_decimals(totals.protein),
            calories: truncate_to_two_decimals(totals.calories),
            carbs: truncate_to_two_decimals(totals.carbs),
            fat: truncate_to_two_decimals(totals.fat),
        }
    }
}

impl fmt::Display for MacroTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Protein:  {}g", self.protein)?;
        writeln!(f, "Carbs:    {}g", self.carbs)?;
        writeln!(f, "Fat:      {}g", self.fat)?;
        write!(f, "Calories: {} cal", self.calories)
    }
}

/// Drops everything past the second decimal place (no rounding).
pub fn truncate_to_two_decimals(value: f64) -> f64 {
    (value * 100.0).trunc() / 100.0
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
