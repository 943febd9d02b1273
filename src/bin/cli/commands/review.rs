use anyhow::{Context, Result};
use chrono::Utc;

use coin_lib::flashcards::algorithm::{format_interval, preview_all};
use coin_lib::flashcards::{selector, Quality};

use crate::app::App;
use crate::render::terminal::{Color, paint};
use crate::OutputFormat;

pub fn run_review(
    app: &App,
    project_name: &str,
    card_id: &str,
    rating: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let project = app.find_project(project_name)?;
    let quality: Quality = rating.parse()?;
    let card = app.find_card(&project, card_id)?;

    let card = app.storage.submit_review(&project, card.id, quality.value())
        .context("Failed to submit review")?;
    let graduated = selector::should_graduate(&card.schedule, &app.config.graduation_threshold());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": card.id.to_string(),
                "quality": quality.value(),
                "schedule": card.schedule,
                "graduated": graduated,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let result = if quality.is_passing() {
                paint(quality.name(), Color::GREEN, use_color)
            } else {
                paint(quality.name(), Color::RED, use_color)
            };
            println!("Rated \"{}\" {}", card.front, result);
            println!(
                "  Next review in {} ({})",
                format_interval(card.schedule.interval_days),
                card.schedule.next_review_at.format("%Y-%m-%d %H:%M")
            );
            println!(
                "  Repetitions: {}  Strength: {:.2}",
                card.schedule.repetitions, card.schedule.strength_factor
            );
            if graduated {
                println!("  {}", paint("Mastered: this card can be surfaced less often", Color::GREEN, use_color));
            }
        }
    }

    Ok(())
}

pub fn run_preview(app: &App, project_name: &str, card_id: &str, format: &OutputFormat) -> Result<()> {
    let project = app.find_project(project_name)?;
    let card = app.find_card(&project, card_id)?;
    let previews = preview_all(&card.schedule, Utc::now());

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = previews.iter().map(|(quality, hint)| {
                serde_json::json!({
                    "rating": quality.name(),
                    "quality": quality.value(),
                    "interval": hint,
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", card.front);
            println!();
            let buttons: Vec<String> = previews.iter()
                .map(|(quality, hint)| format!("[{} {}]", quality.name(), hint))
                .collect();
            println!("{}", buttons.join("  "));
        }
    }

    Ok(())
}
