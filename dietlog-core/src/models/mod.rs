mod food_entry;
mod meal_plan;
mod meal_type;
mod totals;

pub use food_entry::{FoodEntry, NewFoodEntry, ValidationError};
pub(crate) use food_entry::{check_amount, generate_entry_id};
pub use meal_plan::{parse_quantity, MealPlanDay, MealSlot, Meals, PlanItem, WEEK_LENGTH};
pub use meal_type::MealType;
pub use totals::{truncate_to_two_decimals, MacroTotals};
