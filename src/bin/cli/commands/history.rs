use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, project_name: &str, card_id: &str, format: &OutputFormat) -> Result<()> {
    let project = app.find_project(project_name)?;
    let card = app.find_card(&project, card_id)?;
    let records = app.storage.review_history(&project, card.id)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Plain => {
            println!("{}", card.front);
            if records.is_empty() {
                println!("  (never reviewed)");
                return Ok(());
            }

            for record in &records {
                println!(
                    "  {}  {:<5}  {:>4}d  EF {:.2}",
                    record.reviewed_at.format("%Y-%m-%d %H:%M"),
                    record.quality.name(),
                    record.interval_days,
                    record.strength_factor
                );
            }
        }
    }

    Ok(())
}
