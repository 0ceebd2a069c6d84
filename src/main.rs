use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{ConfigCommand, FoodCommand, GoalsCommand, PlanCommand, WatchCommand};
use config::Config;
use dietlog_core::{FileStore, FoodLogStore, GoalsStore, MealPlanStore, SystemClock};

#[derive(Parser)]
#[command(name = "dietlog")]
#[command(version)]
#[command(about = "Daily food log and weekly meal planner", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log food eaten today
    Food(FoodCommand),

    /// Manage the weekly meal plan
    Plan(PlanCommand),

    /// Show or set nutrition goals
    Goals(GoalsCommand),

    /// Manage configuration
    Config(ConfigCommand),

    /// Keep running and clear the food log when the day changes
    Watch(WatchCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    execute_command(&cli.command, &config, cli_config_path)
}

/// Logs go to stderr so that JSON output on stdout stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dietlog=warn,dietlog_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute_command(
    command: &Option<Commands>,
    config: &Config,
    cli_config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Some(Commands::Food(cmd)) => {
            let storage = FileStore::new(config.data_dir.value.clone());
            let mut food_log = FoodLogStore::new(&storage, SystemClock);
            food_log.activate();
            let mut goals = GoalsStore::new(&storage);
            goals.initialize();
            cmd.run(&mut food_log, &goals, config)?;
        }
        Some(Commands::Plan(cmd)) => {
            let storage = FileStore::new(config.data_dir.value.clone());
            let mut plans = MealPlanStore::new(&storage, SystemClock);
            plans.initialize();
            cmd.run(&mut plans, config)?;
        }
        Some(Commands::Goals(cmd)) => {
            let storage = FileStore::new(config.data_dir.value.clone());
            let mut food_log = FoodLogStore::new(&storage, SystemClock);
            food_log.activate();
            let mut goals = GoalsStore::new(&storage);
            goals.initialize();
            cmd.run(&mut goals, &food_log)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(config, cli_config_path)?;
        }
        Some(Commands::Watch(cmd)) => {
            let storage = FileStore::new(config.data_dir.value.clone());
            let mut food_log = FoodLogStore::new(storage, SystemClock);
            food_log.activate();
            cmd.run(&mut food_log)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
