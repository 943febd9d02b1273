use anyhow::{Context, Result};
use uuid::Uuid;

use coin_lib::flashcards::OfflineReview;

use crate::app::App;
use crate::OutputFormat;

pub fn run_sync(app: &App, project_name: &str, content: &str, format: &OutputFormat) -> Result<()> {
    let project = app.find_project(project_name)?;
    let reviews: Vec<OfflineReview> = serde_json::from_str(content)
        .context("Expected a JSON array of {\"cardId\", \"quality\", \"reviewedAt\"} objects")?;

    let report = app.storage.apply_offline_reviews(&project, reviews)
        .context("Failed to apply offline reviews")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            println!("Synced {} review(s) into {}", report.applied, project);
            if report.stale > 0 {
                println!("  {} stale (older than the card's last review)", report.stale);
            }
            if report.rejected > 0 {
                println!("  {} rejected (unknown card or invalid rating)", report.rejected);
            }
        }
    }

    Ok(())
}

pub fn run_mark_synced(app: &App, project_name: &str, cards: &[String], format: &OutputFormat) -> Result<()> {
    let project = app.find_project(project_name)?;

    let ids: Vec<Uuid> = if cards.is_empty() {
        app.storage.dirty_cards(&project)?.iter().map(|c| c.id).collect()
    } else {
        cards.iter()
            .map(|id| app.find_card(&project, id).map(|c| c.id))
            .collect::<Result<_>>()?
    };

    let updated = app.storage.mark_synced(&project, &ids)
        .context("Failed to mark cards as synced")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "project": project,
                "synced": updated,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Marked {} card(s) as synced", updated);
        }
    }

    Ok(())
}
