//! Deck export in Anki's text import format
//!
//! The file is plain CSV (front, back, tags) preceded by `#` header lines
//! that tell Anki how to read it, so it imports without manual mapping.

use std::io::Write;

use thiserror::Error;

use super::models::Card;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Anki tags are space separated, so spaces inside a tag become underscores
fn anki_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| tag.split_whitespace().collect::<Vec<_>>().join("_"))
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write `cards` as an Anki-importable CSV into `deck`, returning the row count
pub fn write_anki_csv<W: Write>(mut out: W, deck: &str, cards: &[Card]) -> Result<usize, ExportError> {
    // Header values must stay on one line
    let deck = deck.split_whitespace().collect::<Vec<_>>().join(" ");

    writeln!(out, "#separator:Comma")?;
    writeln!(out, "#html:false")?;
    writeln!(out, "#deck:{}", deck)?;
    writeln!(out, "#tags column:3")?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    for card in cards {
        let tags = anki_tags(&card.tags);
        writer.write_record([card.front.as_str(), card.back.as_str(), tags.as_str()])?;
    }
    writer.flush()?;

    log::debug!("Exported {} cards to deck '{}'", cards.len(), deck);
    Ok(cards.len())
}
