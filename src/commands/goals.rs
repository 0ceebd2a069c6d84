use clap::{Args, Subcommand};
use serde::Serialize;

use dietlog_core::{Clock, FoodLogStore, GoalProgress, GoalsStore, KeyValueStore};

use super::OutputFormat;

#[derive(Args)]
pub struct GoalsCommand {
    #[command(subcommand)]
    pub command: GoalsSubcommand,
}

#[derive(Subcommand)]
pub enum GoalsSubcommand {
    /// Show goals and today's progress
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change one or both goals
    Set {
        /// Daily protein goal in grams
        #[arg(long, short)]
        protein: Option<f64>,

        /// Daily calorie goal
        #[arg(long = "calories", short = 'k')]
        calories: Option<f64>,
    },
}

#[derive(Serialize)]
struct GoalsView {
    protein_goal: f64,
    calorie_goal: f64,
    progress: GoalProgress,
}

impl GoalsCommand {
    pub fn run<G, S, C>(
        &self,
        goals: &mut GoalsStore<G>,
        food_log: &FoodLogStore<S, C>,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        G: KeyValueStore,
        S: KeyValueStore,
        C: Clock,
    {
        match &self.command {
            GoalsSubcommand::Show { format } => {
                let view = GoalsView {
                    protein_goal: goals.protein_goal(),
                    calorie_goal: goals.calorie_goal(),
                    progress: goals.progress(&food_log.totals()),
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "Protein:  {}g ({:.0}% today)",
                            view.protein_goal, view.progress.protein_percent
                        );
                        println!(
                            "Calories: {} cal ({:.0}% today)",
                            view.calorie_goal, view.progress.calorie_percent
                        );
                    }
                }
                Ok(())
            }

            GoalsSubcommand::Set { protein, calories } => {
                if protein.is_none() && calories.is_none() {
                    return Err("Nothing to set. Use --protein and/or --calories.".into());
                }
                if let Some(grams) = protein {
                    goals.set_protein_goal(*grams);
                    println!("Protein goal: {}g", goals.protein_goal());
                }
                if let Some(cal) = calories {
                    goals.set_calorie_goal(*cal);
                    println!("Calorie goal: {} cal", goals.calorie_goal());
                }
                Ok(())
            }
        }
    }
}
