//! Amount conversions for recipe servings.

/// Serving weight used when a recipe does not report one.
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// Grams per unit for the units a recipe amount can be given in.
fn grams_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "g" => Some(1.0),
        "oz" => Some(28.3495),
        "ml" => Some(1.0),
        _ => None,
    }
}

/// Converts an amount of a recipe into a number of servings.
///
/// `serving` amounts pass through unchanged. Unknown units count as one
/// serving.
pub fn convert_to_servings(amount: f64, unit: &str, serving_size_grams: f64) -> f64 {
    if unit == "serving" {
        return amount;
    }
    let Some(grams_per_unit) = grams_per_unit(unit) else {
        return 1.0;
    };
    let serving_size = if serving_size_grams > 0.0 {
        serving_size_grams
    } else {
        DEFAULT_SERVING_GRAMS
    };
    amount * grams_per_unit / serving_size
}

/// Display string for a logged amount: "1 serving", "2 servings", "100 g".
pub fn format_amount(amount: f64, unit: &str) -> String {
    if unit == "serving" {
        let noun = if amount == 1.0 { "serving" } else { "servings" };
        format!("{} {}", amount, noun)
    } else {
        format!("{} {}", amount, unit)
    }
}
