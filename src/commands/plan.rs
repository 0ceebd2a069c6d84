use clap::{Args, Subcommand};
use std::io::{self, Write};

use dietlog_core::models::parse_quantity;
use dietlog_core::{Clock, KeyValueStore, MealPlanStore, MealType, PlanItem};

use super::{block_on, nutrition_client, parse_date, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// List all planned days
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the plan for one day
    Show {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a custom food to a meal
    Add {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Food name
        name: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: String,

        /// Calories per unit
        #[arg(long = "calories", short = 'k', default_value = "0")]
        calories: f64,

        /// Protein per unit, in grams
        #[arg(long, short, default_value = "0")]
        protein: f64,

        /// Quantity multiplier
        #[arg(long, short, default_value = "1")]
        quantity: String,
    },

    /// Look up a recipe and add it to a meal
    AddRecipe {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Recipe ID from `food search --recipes`
        id: u64,

        /// Name to show in the plan
        #[arg(long)]
        name: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: String,

        /// Number of servings
        #[arg(long, short, default_value = "1")]
        quantity: String,
    },

    /// Remove an item from a meal
    Remove {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Item ID as shown by `plan show`
        item_id: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: String,
    },

    /// Set the notes of a day
    Notes {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Note text
        text: String,
    },

    /// Delete the plan for one day
    Delete {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Delete all plans and start a fresh week from today
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl PlanCommand {
    pub fn run<S: KeyValueStore, C: Clock>(
        &self,
        plans: &mut MealPlanStore<S, C>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PlanSubcommand::List { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(plans.plans())?);
                    }
                    OutputFormat::Text => {
                        if plans.plans().is_empty() {
                            println!("No meal plans found");
                            return Ok(());
                        }
                        for day in plans.plans() {
                            let count = day.item_count();
                            let items_str = if count == 1 {
                                "1 item".to_string()
                            } else {
                                format!("{} items", count)
                            };
                            println!(
                                "{} {:9} {:>6} cal {:>6}g protein ({})",
                                day.date,
                                day.date.format("%A").to_string(),
                                day.total_calories(),
                                day.total_protein(),
                                items_str
                            );
                        }
                        println!("\nTotal: {} day(s)", plans.plans().len());
                    }
                }
                Ok(())
            }

            PlanSubcommand::Show { date, format } => {
                let date = parse_date(date)?;
                let day = plans.get_or_create_daily_plan(date);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&day)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", day);
                    }
                }
                Ok(())
            }

            PlanSubcommand::Add {
                date,
                name,
                meal_type,
                calories,
                protein,
                quantity,
            } => {
                let date = parse_date(date)?;
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                if name.trim().is_empty() {
                    return Err("Food name cannot be empty".into());
                }

                let item = PlanItem::custom(
                    name.trim(),
                    *calories,
                    *protein,
                    parse_quantity(quantity),
                );
                item.validate()?;
                println!("Added to {} on {}: {} ({})", meal_type, date, item.name, item.id);
                plans.add_item(date, meal_type, item);
                Ok(())
            }

            PlanSubcommand::AddRecipe {
                date,
                id,
                name,
                meal_type,
                quantity,
            } => {
                let date = parse_date(date)?;
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                let client = nutrition_client(config)?;
                let per_serving = block_on(client.get_recipe_nutrition(*id))??;

                let item = PlanItem::from_recipe(
                    *id,
                    name.as_str(),
                    per_serving.facts.calories,
                    per_serving.facts.protein,
                    parse_quantity(quantity),
                );
                item.validate()?;
                println!("Added to {} on {}: {} ({})", meal_type, date, item.name, item.id);
                plans.add_item(date, meal_type, item);
                Ok(())
            }

            PlanSubcommand::Remove {
                date,
                item_id,
                meal_type,
            } => {
                let date = parse_date(date)?;
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;

                if !plans.remove_item(date, meal_type, item_id) {
                    return Err(
                        format!("Item {} not found in {} on {}", item_id, meal_type, date).into(),
                    );
                }
                println!("Removed {} from {} on {}", item_id, meal_type, date);
                Ok(())
            }

            PlanSubcommand::Notes { date, text } => {
                let date = parse_date(date)?;
                let day = plans.get_or_create_daily_plan(date).with_notes(text.as_str());
                plans.add_or_update_meal_plan(day);
                println!("Updated notes for {}", date);
                Ok(())
            }

            PlanSubcommand::Delete { date, force } => {
                let date = parse_date(date)?;
                let day = plans
                    .get_meal_plan_by_date(date)
                    .ok_or_else(|| format!("Meal plan not found: {}", date))?;

                if !force && !confirm(&format!(
                    "Delete meal plan for {} ({} item(s))?",
                    date,
                    day.item_count()
                ))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                plans.delete_meal_plan(date);
                println!("Deleted meal plan for {}", date);
                Ok(())
            }

            PlanSubcommand::Clear { force } => {
                if !force && !confirm("Delete all meal plans?")? {
                    println!("Clear cancelled.");
                    return Ok(());
                }

                plans.clear_all();
                println!("Cleared all meal plans.");
                Ok(())
            }
        }
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::config::{ConfigSource, ConfigValue, NutritionConfig};
    use dietlog_core::storage::MEAL_PLANS_KEY;
    use dietlog_core::{FixedClock, MemoryStore};
    use std::path::PathBuf;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn setup() -> MealPlanStore<MemoryStore, FixedClock> {
        let mut plans = MealPlanStore::new(MemoryStore::new(), FixedClock::at_date(today()));
        plans.initialize();
        plans
    }

    fn test_config() -> Config {
        Config {
            data_dir: ConfigValue::new(PathBuf::from("/unused"), ConfigSource::Default),
            config_file: None,
            nutrition: NutritionConfig::default(),
        }
    }

    fn run(plans: &mut MealPlanStore<MemoryStore, FixedClock>, command: PlanSubcommand) {
        PlanCommand { command }.run(plans, &test_config()).unwrap();
    }

    #[test]
    fn test_add_custom_item_with_quantity() {
        let mut plans = setup();
        run(
            &mut plans,
            PlanSubcommand::Add {
                date: "2024-05-07".to_string(),
                name: "Greek yogurt".to_string(),
                meal_type: "breakfast".to_string(),
                calories: 100.0,
                protein: 10.0,
                quantity: "2".to_string(),
            },
        );

        let day = plans
            .get_meal_plan_by_date(NaiveDate::from_ymd_opt(2024, 5, 7).unwrap())
            .unwrap();
        let slot = day.meals.slot(MealType::Breakfast);
        assert_eq!(slot.items().len(), 1);
        assert_eq!(slot.total_calories(), 200.0);
        assert_eq!(slot.total_protein(), 20.0);
    }

    #[test]
    fn test_add_with_bad_quantity_uses_one() {
        let mut plans = setup();
        run(
            &mut plans,
            PlanSubcommand::Add {
                date: "2024-05-06".to_string(),
                name: "Toast".to_string(),
                meal_type: "snacks".to_string(),
                calories: 80.0,
                protein: 3.0,
                quantity: "lots".to_string(),
            },
        );

        let day = plans.get_meal_plan_by_date(today()).unwrap();
        assert_eq!(day.meals.snacks.total_calories(), 80.0);
    }

    #[test]
    fn test_add_rejects_non_finite_numbers_and_keeps_day() {
        let storage = MemoryStore::new();
        let clock = FixedClock::at_date(today());
        let mut plans = MealPlanStore::new(storage.clone(), clock.clone());
        plans.initialize();

        let add = |name: &str, calories: f64, quantity: &str| PlanCommand {
            command: PlanSubcommand::Add {
                date: "2024-05-06".to_string(),
                name: name.to_string(),
                meal_type: "breakfast".to_string(),
                calories,
                protein: 10.0,
                quantity: quantity.to_string(),
            },
        };

        add("Eggs", 140.0, "1").run(&mut plans, &test_config()).unwrap();
        assert!(add("Bad", f64::NAN, "1").run(&mut plans, &test_config()).is_err());
        assert!(add("Bad", f64::INFINITY, "1").run(&mut plans, &test_config()).is_err());
        assert!(add("Bad", -100.0, "1").run(&mut plans, &test_config()).is_err());
        assert!(add("Huge", 140.0, "1e308").run(&mut plans, &test_config()).is_err());

        assert!(!storage.get(MEAL_PLANS_KEY).unwrap().unwrap().contains("null"));

        let mut reloaded = MealPlanStore::new(storage, clock);
        reloaded.initialize();
        let day = reloaded.get_meal_plan_by_date(today()).unwrap();
        assert_eq!(day.item_count(), 1);
        assert_eq!(day.meals.breakfast.items()[0].name, "Eggs");
        assert_eq!(reloaded.plans().len(), 7);
    }

    #[test]
    fn test_remove_missing_item_is_error() {
        let mut plans = setup();
        let result = PlanCommand {
            command: PlanSubcommand::Remove {
                date: "2024-05-06".to_string(),
                item_id: "food-nothere".to_string(),
                meal_type: "lunch".to_string(),
            },
        }
        .run(&mut plans, &test_config());

        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_notes_and_delete() {
        let mut plans = setup();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        run(
            &mut plans,
            PlanSubcommand::Notes {
                date: "2024-06-01".to_string(),
                text: "Birthday dinner".to_string(),
            },
        );
        assert_eq!(
            plans.get_meal_plan_by_date(date).unwrap().notes.as_deref(),
            Some("Birthday dinner")
        );

        run(
            &mut plans,
            PlanSubcommand::Delete {
                date: "2024-06-01".to_string(),
                force: true,
            },
        );
        assert!(plans.get_meal_plan_by_date(date).is_none());
    }

    #[test]
    fn test_clear_reseeds_week() {
        let mut plans = setup();
        run(
            &mut plans,
            PlanSubcommand::Notes {
                date: "2024-06-01".to_string(),
                text: "extra day".to_string(),
            },
        );
        assert_eq!(plans.plans().len(), 8);

        run(&mut plans, PlanSubcommand::Clear { force: true });

        assert_eq!(plans.plans().len(), 7);
        assert_eq!(plans.plans()[0].date, today());
    }

    #[test]
    fn test_invalid_date_is_error() {
        let mut plans = setup();
        let result = PlanCommand {
            command: PlanSubcommand::Show {
                date: "tomorrow".to_string(),
                format: OutputFormat::Text,
            },
        }
        .run(&mut plans, &test_config());
        assert!(result.is_err());
    }
}
