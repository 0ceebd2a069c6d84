use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::meal_type::MealType;

/// A food that was eaten today, as recorded in the daily log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: String,
    pub name: String,
    /// Display amount, e.g. "100 g" or "2 servings"
    pub amount: String,
    pub meal_type: MealType,
    pub protein: f64,
    pub calories: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for FoodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}g protein, {} cal",
            self.name, self.amount, self.protein, self.calories
        )
    }
}

/// A food entry before it is added to the log.
///
/// The log assigns `id` and `created_at` when the entry is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodEntry {
    pub name: String,
    pub amount: String,
    pub meal_type: MealType,
    pub protein: f64,
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NewFoodEntry {
    pub fn new(name: impl Into<String>, amount: impl Into<String>, meal_type: MealType) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            meal_type,
            protein: 0.0,
            calories: 0.0,
            carbs: 0.0,
            fat: 0.0,
        }
    }

    pub fn with_protein(mut self, protein: f64) -> Self {
        self.protein = protein;
        self
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories = calories;
        self
    }

    pub fn with_carbs(mut self, carbs: f64) -> Self {
        self.carbs = carbs;
        self
    }

    pub fn with_fat(mut self, fat: f64) -> Self {
        self.fat = fat;
        self
    }

    /// Builds an entry from the raw text of the custom food form.
    ///
    /// All four text fields are required. Protein and calories must parse as
    /// finite, non-negative numbers. Carbs and fat are not collected by the
    /// form and stay at zero.
    pub fn from_form(
        name: &str,
        amount: &str,
        meal_type: MealType,
        protein: &str,
        calories: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        let amount = amount.trim();
        let any_blank = [name, amount, protein.trim(), calories.trim()]
            .iter()
            .any(|field| field.is_empty());
        if any_blank {
            return Err(ValidationError::MissingFields);
        }

        let protein = parse_macro("protein", protein)?;
        let calories = parse_macro("calories", calories)?;

        Ok(Self::new(name, amount, meal_type)
            .with_protein(protein)
            .with_calories(calories))
    }

    /// Checks that every numeric field is finite and non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("protein", self.protein),
            ("calories", self.calories),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            check_amount(field, value)?;
        }
        Ok(())
    }

    pub(crate) fn into_entry(self, id: String, created_at: DateTime<Utc>) -> FoodEntry {
        FoodEntry {
            id,
            name: self.name,
            amount: self.amount,
            meal_type: self.meal_type,
            protein: self.protein,
            calories: self.calories,
            carbs: self.carbs,
            fat: self.fat,
            created_at,
        }
    }
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Invalid {field} value '{value}'. Enter a non-negative number.")]
    InvalidNumber { field: &'static str, value: String },
}

/// Rejects amounts that are negative or not finite.
pub(crate) fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }
}

fn parse_macro(field: &'static str, input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            field,
            value: input.trim().to_string(),
        }),
    }
}

/// Generates a log entry id: base-36 milliseconds followed by a base-36
/// random suffix.
pub(crate) fn generate_entry_id(now: DateTime<Utc>) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let suffix: u64 = rand::random();
    format!("{}{}", to_base36(millis), to_base36(suffix))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
