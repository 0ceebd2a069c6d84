use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};

use dietlog_core::nutrition::SearchParams;
use dietlog_core::{
    Clock, FoodLogStore, GoalProgress, GoalsStore, KeyValueStore, MacroTotals, MealType,
    NewFoodEntry,
};

use super::{block_on, nutrition_client, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Log a custom food
    Add {
        /// Food name
        name: String,

        /// Amount eaten (e.g. "1 cup", "200 g")
        #[arg(long, short)]
        amount: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: String,

        /// Protein in grams
        #[arg(long, short)]
        protein: String,

        /// Calories
        #[arg(long = "calories", short = 'k')]
        calories: String,
    },

    /// Search the nutrition service for ingredients or recipes
    Search {
        /// Search text
        query: String,

        /// Search recipes instead of ingredients
        #[arg(long)]
        recipes: bool,

        /// Maximum number of results
        #[arg(long, short, default_value = "3")]
        limit: u32,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Look up an ingredient and log it
    LogIngredient {
        /// Ingredient ID from `food search`
        id: u64,

        /// Amount eaten
        #[arg(long, short, default_value = "100")]
        amount: f64,

        /// Unit of the amount (g, oz, ml, ...)
        #[arg(long, short, default_value = "g")]
        unit: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: String,

        /// Name to log instead of the one reported by the service
        #[arg(long)]
        name: Option<String>,
    },

    /// Look up a recipe and log it
    LogRecipe {
        /// Recipe ID from `food search --recipes`
        id: u64,

        /// Name to log
        #[arg(long)]
        name: String,

        /// Amount eaten
        #[arg(long, short, default_value = "1")]
        amount: f64,

        /// Unit of the amount (serving, g, oz, ml)
        #[arg(long, short, default_value = "serving")]
        unit: String,

        /// Meal type (breakfast, lunch, dinner, snacks)
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: String,
    },

    /// List today's food log
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show one meal
        #[arg(long = "meal", short = 'm', value_name = "MEAL")]
        meal_type: Option<String>,
    },

    /// Show today's totals and goal progress
    Summary {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Clear today's food log
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Serialize)]
struct Summary {
    totals: MacroTotals,
    protein_goal: f64,
    calorie_goal: f64,
    progress: GoalProgress,
}

impl FoodCommand {
    pub fn run<S, C, G>(
        &self,
        food_log: &mut FoodLogStore<S, C>,
        goals: &GoalsStore<G>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        S: KeyValueStore,
        C: Clock,
        G: KeyValueStore,
    {
        match &self.command {
            FoodSubcommand::Add {
                name,
                amount,
                meal_type,
                protein,
                calories,
            } => {
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                let entry = NewFoodEntry::from_form(name, amount, meal_type, protein, calories)?;
                log_food(food_log, entry)
            }

            FoodSubcommand::Search {
                query,
                recipes,
                limit,
                format,
            } => {
                let client = nutrition_client(config)?;
                let params = SearchParams::new(query.as_str()).with_limit(*limit);

                if *recipes {
                    let results = block_on(client.search_recipes(&params))??;
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&results)?);
                        }
                        OutputFormat::Text => {
                            if results.is_empty() {
                                println!("No recipes found");
                            }
                            for recipe in &results {
                                println!("{:>8}  {}", recipe.id, recipe.title);
                            }
                        }
                    }
                } else {
                    let results = block_on(client.search_ingredients(&params))??;
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&results)?);
                        }
                        OutputFormat::Text => {
                            if results.is_empty() {
                                println!("No ingredients found");
                            }
                            for ingredient in &results {
                                println!("{:>8}  {}", ingredient.id, ingredient.name);
                            }
                        }
                    }
                }
                Ok(())
            }

            FoodSubcommand::LogIngredient {
                id,
                amount,
                unit,
                meal_type,
                name,
            } => {
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                let client = nutrition_client(config)?;
                let info = block_on(client.get_nutrition(*id, *amount, unit))??;

                let name = name
                    .clone()
                    .or_else(|| info.name.clone())
                    .unwrap_or_else(|| format!("Ingredient {}", id));
                log_food(food_log, info.to_food_entry(name, meal_type))
            }

            FoodSubcommand::LogRecipe {
                id,
                name,
                amount,
                unit,
                meal_type,
            } => {
                let meal_type: MealType = meal_type.parse().map_err(|e: String| e)?;
                let client = nutrition_client(config)?;
                let info = block_on(client.get_recipe_nutrition_for(*id, *amount, unit))??;
                log_food(food_log, info.to_food_entry(name.as_str(), meal_type))
            }

            FoodSubcommand::List { format, meal_type } => {
                let filter: Option<MealType> = match meal_type {
                    Some(mt) => Some(mt.parse().map_err(|e: String| e)?),
                    None => None,
                };

                match format {
                    OutputFormat::Json => {
                        let foods: Vec<_> = food_log
                            .foods()
                            .iter()
                            .filter(|f| filter.map_or(true, |mt| f.meal_type == mt))
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&foods)?);
                    }
                    OutputFormat::Text => {
                        if food_log.foods().is_empty() {
                            println!("No food logged today");
                            return Ok(());
                        }
                        for meal_type in MealType::ALL {
                            if filter.is_some_and(|mt| mt != meal_type) {
                                continue;
                            }
                            let entries: Vec<_> = food_log.foods_for(meal_type).collect();
                            if entries.is_empty() {
                                continue;
                            }
                            println!("{}", meal_type.label());
                            println!("{}", "-".repeat(meal_type.label().len()));
                            for entry in entries {
                                println!("  {}", entry);
                            }
                            println!();
                        }
                        println!("Total: {} item(s)", food_log.foods().len());
                    }
                }
                Ok(())
            }

            FoodSubcommand::Summary { format } => {
                let totals = food_log.totals();
                let summary = Summary {
                    progress: goals.progress(&totals),
                    protein_goal: goals.protein_goal(),
                    calorie_goal: goals.calorie_goal(),
                    totals,
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    }
                    OutputFormat::Text => {
                        println!("Today");
                        println!("=====\n");
                        println!("{}", summary.totals);
                        println!();
                        println!(
                            "Protein goal:  {}g ({:.0}%)",
                            summary.protein_goal, summary.progress.protein_percent
                        );
                        println!(
                            "Calorie goal:  {} cal ({:.0}%)",
                            summary.calorie_goal, summary.progress.calorie_percent
                        );
                    }
                }
                Ok(())
            }

            FoodSubcommand::Reset { force } => {
                if !force {
                    print!(
                        "Clear {} logged item(s) for today? [y/N] ",
                        food_log.foods().len()
                    );
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Reset cancelled.");
                        return Ok(());
                    }
                }

                food_log.reset_foods();
                println!("Food log cleared.");
                Ok(())
            }
        }
    }
}

fn log_food<S: KeyValueStore, C: Clock>(
    food_log: &mut FoodLogStore<S, C>,
    entry: NewFoodEntry,
) -> Result<(), Box<dyn std::error::Error>> {
    entry.validate()?;
    let logged = food_log.add_food(entry);
    println!("Logged {}: {}", logged.meal_type, logged);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::config::{ConfigSource, ConfigValue, NutritionConfig};
    use dietlog_core::{FixedClock, MemoryStore};
    use std::path::PathBuf;

    fn setup() -> (FoodLogStore<MemoryStore, FixedClock>, GoalsStore<MemoryStore>) {
        let storage = MemoryStore::new();
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let mut food_log = FoodLogStore::new(storage.clone(), clock);
        food_log.activate();
        let mut goals = GoalsStore::new(storage);
        goals.initialize();
        (food_log, goals)
    }

    fn test_config() -> Config {
        Config {
            data_dir: ConfigValue::new(PathBuf::from("/unused"), ConfigSource::Default),
            config_file: None,
            nutrition: NutritionConfig::default(),
        }
    }

    fn add(name: &str, meal: &str, protein: &str, calories: &str) -> FoodCommand {
        FoodCommand {
            command: FoodSubcommand::Add {
                name: name.to_string(),
                amount: "1 serving".to_string(),
                meal_type: meal.to_string(),
                protein: protein.to_string(),
                calories: calories.to_string(),
            },
        }
    }

    #[test]
    fn test_add_custom_food() {
        let (mut food_log, goals) = setup();
        let config = test_config();

        add("Oatmeal", "breakfast", "6", "150")
            .run(&mut food_log, &goals, &config)
            .unwrap();

        assert_eq!(food_log.foods().len(), 1);
        let entry = &food_log.foods()[0];
        assert_eq!(entry.name, "Oatmeal");
        assert_eq!(entry.meal_type, MealType::Breakfast);
        assert_eq!(entry.protein, 6.0);
        assert_eq!(entry.calories, 150.0);
    }

    #[test]
    fn test_add_rejects_invalid_numbers() {
        let (mut food_log, goals) = setup();
        let config = test_config();

        let result = add("Oatmeal", "breakfast", "six", "150").run(&mut food_log, &goals, &config);
        assert!(result.is_err());
        assert!(food_log.foods().is_empty());
    }

    #[test]
    fn test_add_rejects_unknown_meal() {
        let (mut food_log, goals) = setup();
        let config = test_config();

        let result = add("Oatmeal", "brunch", "6", "150").run(&mut food_log, &goals, &config);
        assert!(result.unwrap_err().to_string().contains("Invalid meal type"));
    }

    #[test]
    fn test_reset_with_force() {
        let (mut food_log, goals) = setup();
        let config = test_config();
        add("Apple", "snacks", "0.5", "95")
            .run(&mut food_log, &goals, &config)
            .unwrap();

        FoodCommand {
            command: FoodSubcommand::Reset { force: true },
        }
        .run(&mut food_log, &goals, &config)
        .unwrap();

        assert!(food_log.foods().is_empty());
    }

    #[test]
    fn test_lookup_without_api_key_fails() {
        let (mut food_log, goals) = setup();
        let config = test_config();

        let cmd = FoodCommand {
            command: FoodSubcommand::Search {
                query: "banana".to_string(),
                recipes: false,
                limit: 3,
                format: OutputFormat::Text,
            },
        };
        let err = cmd.run(&mut food_log, &goals, &config).unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
