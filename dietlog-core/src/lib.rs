//! dietlog core library
//!
//! Persisted state for the dietlog application: the daily food log, the
//! weekly meal plan and nutrition goals, plus the client for the external
//! nutrition lookup service.

pub mod clock;
pub mod models;
pub mod nutrition;
pub mod storage;
pub mod stores;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{
    FoodEntry, MacroTotals, MealPlanDay, MealSlot, MealType, Meals, NewFoodEntry, PlanItem,
    ValidationError,
};
pub use nutrition::{NutritionClient, NutritionError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use stores::{FoodLogStore, GoalProgress, GoalsStore, MealPlanStore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
