use anyhow::{Context, Result};

use coin_lib::config::CoinConfig;
use coin_lib::flashcards::StudyPolicy;

use crate::app::App;
use crate::OutputFormat;

fn print_config(app: &App, config: &CoinConfig, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Plain => {
            let policy = match config.study_policy {
                StudyPolicy::DueOnly => "dueOnly",
                StudyPolicy::FallbackToAll => "fallbackToAll",
            };
            println!("{}", CoinConfig::path(&app.data_dir).display());
            println!("  graduationIntervalDays:  {}", config.graduation_interval_days);
            println!("  graduationRepetitions:   {}", config.graduation_repetitions);
            println!("  studyPolicy:             {}", policy);
        }
    }
    Ok(())
}

pub fn run_show(app: &App, format: &OutputFormat) -> Result<()> {
    print_config(app, &app.config, format)
}

pub fn run_set(app: &App, key: &str, value: &str, format: &OutputFormat) -> Result<()> {
    let mut config = app.config.clone();
    config.set(key, value)?;
    config.save(&app.data_dir)
        .context("Failed to save config")?;

    log::info!("Saved config to {:?}", CoinConfig::path(&app.data_dir));
    print_config(app, &config, format)
}
