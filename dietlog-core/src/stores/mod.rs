//! State stores over a [`KeyValueStore`](crate::storage::KeyValueStore).
//!
//! Each store owns its collection and is the only thing that mutates it.
//! Stores are constructed by the application entry point with explicit
//! storage and clock handles, then initialized once before use.

mod food_log;
mod goals;
mod meal_plan;

pub use food_log::FoodLogStore;
pub use goals::{GoalProgress, GoalsStore, DEFAULT_CALORIE_GOAL, DEFAULT_PROTEIN_GOAL};
pub use meal_plan::MealPlanStore;
