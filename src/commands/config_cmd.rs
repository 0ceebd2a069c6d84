use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# dietlog configuration

# Directory for the food log, meal plans and goals
# (default: platform data directory, e.g. ~/.local/share/dietlog)
# data_dir: ~/.local/share/dietlog

# Nutrition lookup service, used by `food search`, `food log-ingredient`,
# `food log-recipe` and `plan add-recipe`
nutrition:
  # api_key: your-api-key
  base_url: https://api.spoonacular.com
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            let path = cli_config_path.unwrap_or_else(Config::default_config_path);
                            println!("Config file: {} (not found)", path.display());
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("nutrition.base_url: {}", config.nutrition.base_url);
                        println!(
                            "nutrition.api_key: {}",
                            if config.nutrition.is_configured() {
                                "(set)"
                            } else {
                                "(not set)"
                            }
                        );
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);
                if write_default_config(&config_path)? {
                    println!("Created config file: {}", config_path.display());
                    println!("\nEdit this file to customize your settings.");
                } else {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'dietlog config show' to view current configuration.");
                }
                Ok(())
            }
        }
    }
}

/// Writes the commented default config. Returns false if the file exists.
fn write_default_config(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(DEFAULT_CONFIG.as_bytes())?;
    Ok(true)
}
