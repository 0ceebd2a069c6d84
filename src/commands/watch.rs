use clap::Args;
use std::time::Duration;

use dietlog_core::{Clock, FoodLogStore, KeyValueStore};

#[derive(Args)]
pub struct WatchCommand {
    /// Seconds between daily reset checks
    #[arg(long, short, default_value = "60")]
    interval: u64,
}

impl WatchCommand {
    /// Re-runs the daily reset check until interrupted.
    pub fn run<S: KeyValueStore, C: Clock>(
        &self,
        food_log: &mut FoodLogStore<S, C>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.interval == 0 {
            return Err("Interval must be at least 1 second".into());
        }

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let mut ticker = tokio::time::interval(Duration::from_secs(self.interval));
            // The first tick completes immediately; activation already checked
            ticker.tick().await;

            println!(
                "Watching for day changes every {}s (Ctrl-C to stop)",
                self.interval
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if food_log.handle_foreground() {
                            println!("New day: food log cleared.");
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Stopping watch");
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}
