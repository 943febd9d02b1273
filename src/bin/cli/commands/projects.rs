use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{Color, paint};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let projects = app.storage.list_projects()?;
    let threshold = app.config.graduation_threshold();

    let mut rows = Vec::with_capacity(projects.len());
    for project in &projects {
        let stats = app.storage.review_stats(project, &threshold)?;
        rows.push((project, stats));
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = rows.iter().map(|(project, stats)| {
                serde_json::json!({
                    "project": project,
                    "totalCards": stats.total_cards,
                    "dueCards": stats.due_cards,
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if rows.is_empty() {
                println!("No projects yet in {}.", app.data_dir.display());
                println!("Add cards with `coin-cli add <project> <front> <back>`.");
                return Ok(());
            }

            for (project, stats) in &rows {
                let due = if stats.due_cards > 0 {
                    paint(&format!("{} due", stats.due_cards), Color::YELLOW, use_color)
                } else {
                    paint("caught up", Color::GREEN, use_color)
                };
                println!("{} ({} cards, {})", project, stats.total_cards, due);
            }
        }
    }

    Ok(())
}
