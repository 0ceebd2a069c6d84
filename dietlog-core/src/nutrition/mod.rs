//! Client for the external nutrition lookup service.
//!
//! The service resolves a search query to ingredients or recipes and their
//! nutrition facts. Results are handed to the stores by the caller; the
//! stores themselves never touch the network.

mod client;
mod error;
mod types;
mod units;

pub use client::{NutritionClient, SearchParams, SortDirection, DEFAULT_BASE_URL};
pub use error::NutritionError;
pub use types::{Ingredient, NutritionFacts, NutritionInfo, Recipe, RecipeInformation};
pub use units::{convert_to_servings, format_amount, DEFAULT_SERVING_GRAMS};
