use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};

use coin_lib::flashcards::write_anki_csv;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    project_name: &str,
    output: Option<&Path>,
    deck: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let project = app.find_project(project_name)?;
    let cards = app.storage.list_cards(&project)?;
    let deck = deck.unwrap_or(&project);

    let Some(path) = output else {
        // CSV goes straight to stdout, whatever the output format
        write_anki_csv(std::io::stdout().lock(), deck, &cards)?;
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_anki_csv(BufWriter::new(file), deck, &cards)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "project": project,
                "deck": deck,
                "path": path,
                "exported": count,
            }))?);
        }
        OutputFormat::Plain => {
            println!("Exported {} card(s) from {} to {}", count, project, path.display());
            println!("Import it in Anki with File > Import.");
        }
    }

    Ok(())
}
