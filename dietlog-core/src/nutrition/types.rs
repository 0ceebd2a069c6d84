//! Request results and the raw response shapes they are parsed from.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::units::{format_amount, DEFAULT_SERVING_GRAMS};
use crate::models::{MealType, NewFoodEntry};

/// An ingredient search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A recipe search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<f64>,
    /// Per-serving facts, when the search response carried them in this
    /// shape
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub nutrition: Option<NutritionFacts>,
}

/// Macro nutrients of a food or recipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub protein: f64,
    pub calories: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutritionFacts {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            protein: self.protein * factor,
            calories: self.calories * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

/// Nutrition for a specific amount of a food.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionInfo {
    /// Food name, when the service reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub facts: NutritionFacts,
    pub amount: f64,
    pub unit: String,
}

impl NutritionInfo {
    /// Builds a log entry for this nutrition result.
    pub fn to_food_entry(&self, name: impl Into<String>, meal_type: MealType) -> NewFoodEntry {
        NewFoodEntry::new(name, format_amount(self.amount, &self.unit), meal_type)
            .with_protein(self.facts.protein)
            .with_calories(self.facts.calories)
            .with_carbs(self.facts.carbs)
            .with_fat(self.facts.fat)
    }
}

/// Serving details of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecipeInformation {
    pub servings: f64,
    pub serving_size_grams: f64,
}

/// A single named nutrient as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct Nutrient {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IngredientInformationResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nutrition: NutrientList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NutrientList {
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecipeInformationResponse {
    #[serde(default)]
    pub servings: Option<f64>,
    #[serde(default)]
    pub nutrition: Option<RecipeWeight>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecipeWeight {
    #[serde(default)]
    pub weight_per_serving: Option<Weight>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Weight {
    pub amount: f64,
}

/// Recipe nutrition widget: every value is a string with a unit suffix,
/// e.g. `"12g"` or `"450"`.
#[derive(Debug, Deserialize)]
pub(crate) struct NutritionWidgetResponse {
    pub calories: String,
    pub carbs: String,
    pub fat: String,
    pub protein: String,
}

impl IngredientInformationResponse {
    pub(crate) fn into_nutrition(self, amount: f64, unit: &str) -> NutritionInfo {
        let nutrients = &self.nutrition.nutrients;
        NutritionInfo {
            facts: NutritionFacts {
                protein: nutrient_amount(nutrients, "Protein"),
                calories: nutrient_amount(nutrients, "Calories"),
                carbs: nutrient_amount(nutrients, "Carbohydrates"),
                fat: nutrient_amount(nutrients, "Fat"),
            },
            name: self.name.filter(|name| !name.trim().is_empty()),
            amount,
            unit: unit.to_string(),
        }
    }
}

impl RecipeInformationResponse {
    pub(crate) fn into_information(self) -> RecipeInformation {
        let serving_size_grams = self
            .nutrition
            .and_then(|n| n.weight_per_serving)
            .map(|w| w.amount)
            .filter(|grams| *grams > 0.0)
            .unwrap_or(DEFAULT_SERVING_GRAMS);
        RecipeInformation {
            servings: self.servings.unwrap_or(1.0),
            serving_size_grams,
        }
    }
}

impl NutritionWidgetResponse {
    /// Nutrition of one serving.
    pub(crate) fn into_nutrition(self) -> NutritionInfo {
        NutritionInfo {
            name: None,
            facts: NutritionFacts {
                protein: parse_nutrient_value(&self.protein),
                calories: parse_nutrient_value(&self.calories),
                carbs: parse_nutrient_value(&self.carbs),
                fat: parse_nutrient_value(&self.fat),
            },
            amount: 1.0,
            unit: "serving".to_string(),
        }
    }
}

/// Amount of the first nutrient called `name`, or 0 if it is missing.
fn nutrient_amount(nutrients: &[Nutrient], name: &str) -> f64 {
    nutrients
        .iter()
        .find(|n| n.name == name)
        .map(|n| n.amount)
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// Reads the number out of a value like `"12.5g"` or `"1,024kcal"`.
///
/// Everything except digits and dots is dropped; the longest leading
/// number is used. No number at all reads as 0.
pub(crate) fn parse_nutrient_value(raw: &str) -> f64 {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in kept.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = i + 1;
    }

    kept[..end].parse::<f64>().unwrap_or(0.0)
}

/// Deserializes an optional value, treating anything of the wrong shape as
/// absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nutrient_value() {
        assert_eq!(parse_nutrient_value("12g"), 12.0);
        assert_eq!(parse_nutrient_value("12.5g"), 12.5);
        assert_eq!(parse_nutrient_value("450"), 450.0);
        assert_eq!(parse_nutrient_value("1,024kcal"), 1024.0);
        assert_eq!(parse_nutrient_value("1.2.3"), 1.2);
        assert_eq!(parse_nutrient_value("n/a"), 0.0);
        assert_eq!(parse_nutrient_value(""), 0.0);
    }

    #[test]
    fn test_ingredient_information_to_nutrition() {
        let json = r#"{
            "id": 9266,
            "name": "pineapples",
            "nutrition": {"nutrients": [
                {"name": "Calories", "amount": 50.0, "unit": "kcal"},
                {"name": "Fat", "amount": 0.12, "unit": "g"},
                {"name": "Protein", "amount": 0.54, "unit": "g"},
                {"name": "Sugar", "amount": 9.85, "unit": "g"}
            ]}
        }"#;
        let response: IngredientInformationResponse = serde_json::from_str(json).unwrap();
        let info = response.into_nutrition(100.0, "g");

        assert_eq!(info.name.as_deref(), Some("pineapples"));
        assert_eq!(info.facts.calories, 50.0);
        assert_eq!(info.facts.protein, 0.54);
        assert_eq!(info.facts.fat, 0.12);
        // Missing nutrients count as zero
        assert_eq!(info.facts.carbs, 0.0);
        assert_eq!(info.amount, 100.0);
        assert_eq!(info.unit, "g");
    }

    #[test]
    fn test_recipe_information_defaults() {
        let info: RecipeInformationResponse = serde_json::from_str(r#"{"servings": 4}"#).unwrap();
        let info = info.into_information();
        assert_eq!(info.servings, 4.0);
        assert_eq!(info.serving_size_grams, 100.0);

        let json = r#"{"servings": 2,
            "nutrition": {"weightPerServing": {"amount": 325, "unit": "g"}}}"#;
        let info: RecipeInformationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(info.into_information().serving_size_grams, 325.0);
    }

    #[test]
    fn test_nutrition_widget_to_nutrition() {
        let json = r#"{"calories":"316","carbs":"49g","fat":"12g","protein":"3g","bad":[]}"#;
        let widget: NutritionWidgetResponse = serde_json::from_str(json).unwrap();
        let info = widget.into_nutrition();

        assert!(info.name.is_none());
        assert_eq!(info.facts.calories, 316.0);
        assert_eq!(info.facts.carbs, 49.0);
        assert_eq!(info.facts.fat, 12.0);
        assert_eq!(info.facts.protein, 3.0);
        assert_eq!(info.amount, 1.0);
        assert_eq!(info.unit, "serving");
    }

    #[test]
    fn test_search_response_parses() {
        let json = r#"{"results":[{"id":9266,"name":"pineapple","image":"pineapple.jpg"}],
            "offset":0,"number":1,"totalResults":20}"#;
        let response: SearchResponse<Ingredient> = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "pineapple");
    }

    #[test]
    fn test_recipe_nutrition_of_wrong_shape_is_none() {
        let json = r#"{"id":1,"title":"Soup","nutrition":{"nutrients":[]}}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.nutrition.is_none());

        let json = r#"{"id":1,"title":"Soup","servings":2,
            "nutrition":{"protein":10,"calories":200,"carbs":30,"fat":5}}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.nutrition.unwrap().calories, 200.0);
        assert_eq!(recipe.servings, Some(2.0));
    }

    #[test]
    fn test_to_food_entry() {
        let info = NutritionInfo {
            name: None,
            facts: NutritionFacts {
                protein: 20.0,
                calories: 400.0,
                carbs: 50.0,
                fat: 10.0,
            }
            .scaled(2.0),
            amount: 2.0,
            unit: "serving".to_string(),
        };

        let entry = info.to_food_entry("Lasagna", MealType::Dinner);
        assert_eq!(entry.amount, "2 servings");
        assert_eq!(entry.calories, 800.0);
        assert_eq!(entry.protein, 40.0);
        assert_eq!(entry.meal_type, MealType::Dinner);
    }
}
