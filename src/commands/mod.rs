mod config_cmd;
mod food;
mod goals;
mod plan;
mod watch;

use chrono::NaiveDate;
use clap::ValueEnum;
use dietlog_core::{NutritionClient, NutritionError};

use crate::config::Config;

pub use config_cmd::ConfigCommand;
pub use food::FoodCommand;
pub use goals::GoalsCommand;
pub use plan::PlanCommand;
pub use watch::WatchCommand;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses a YYYY-MM-DD date argument.
fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", input))
}

/// Builds a lookup client from the nutrition section of the config.
fn nutrition_client(config: &Config) -> Result<NutritionClient, NutritionError> {
    let api_key = config
        .nutrition
        .api_key
        .clone()
        .ok_or(NutritionError::NotConfigured)?;
    NutritionClient::new(config.nutrition.base_url.clone(), api_key)
}

/// Runs a nutrition lookup to completion on a fresh runtime.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, std::io::Error> {
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(future))
}
