use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, project_name: &str, format: &OutputFormat) -> Result<()> {
    let project = app.find_project(project_name)?;
    let stats = app.storage.review_stats(&project, &app.config.graduation_threshold())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("{}", project);
            println!("  Total:     {}", stats.total_cards);
            println!("  New:       {}", stats.new_cards);
            println!("  Learning:  {}", stats.learning_cards);
            println!("  Review:    {}", stats.review_cards);
            println!("  Due now:   {}", stats.due_cards);
            println!("  Mastered:  {}", stats.graduated_cards);
            println!("  Unsynced:  {}", stats.dirty_cards);
        }
    }

    Ok(())
}
