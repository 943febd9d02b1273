use anyhow::{Context, Result};

use coin_lib::flashcards::{AddCardsReport, NewCard};

use crate::app::App;
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    project_name: &str,
    front: String,
    back: String,
    tags: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let project = app.project_for_write(project_name);

    let mut card = NewCard::new(front, back);
    if let Some(tag_str) = tags {
        card.tags = tag_str.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }

    let report = app.storage.add_cards(&project, vec![card])
        .context("Failed to add card")?;
    print_report(&project, &report, format)
}

pub fn run_import(app: &App, project_name: &str, content: &str, format: &OutputFormat) -> Result<()> {
    let project = app.project_for_write(project_name);

    let cards: Vec<NewCard> = serde_json::from_str(content)
        .context("Expected a JSON array of {\"front\", \"back\", \"tags\"} objects")?;

    let report = app.storage.add_cards(&project, cards)
        .context("Failed to import cards")?;
    print_report(&project, &report, format)
}

fn print_report(project: &str, report: &AddCardsReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "project": project,
                "added": report.added.iter().map(|c| serde_json::json!({
                    "id": c.id.to_string(),
                    "front": c.front,
                })).collect::<Vec<_>>(),
                "duplicates": report.duplicates,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Added {} card(s) to {}", report.added.len(), project);
            for card in &report.added {
                println!("  {}  {}", &card.id.to_string()[..8], card.front);
            }
            if report.duplicates > 0 {
                println!("Skipped {} duplicate(s)", report.duplicates);
            }
        }
    }

    Ok(())
}
