use anyhow::Result;
use chrono::Utc;

use coin_lib::flashcards::{Card, StudyPolicy};

use crate::app::App;
use crate::render::terminal::render_card_table;
use crate::OutputFormat;

pub fn run_list(app: &App, project_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let project = app.find_project(project_name)?;
    let cards = app.storage.list_cards(&project)?;
    print_cards(app, &cards, "No cards in this project.", format, use_color)
}

pub fn run_due(app: &App, project_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let project = app.find_project(project_name)?;
    let cards = app.storage.due_cards(&project)?;
    print_cards(app, &cards, "All caught up! Nothing is due.", format, use_color)
}

pub fn run_queue(
    app: &App,
    project_name: &str,
    fallback: bool,
    limit: Option<usize>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let project = app.find_project(project_name)?;

    let policy = if fallback {
        StudyPolicy::FallbackToAll
    } else {
        app.config.study_policy
    };

    let mut cards = app.storage.study_queue(&project, policy)?;
    if let Some(limit) = limit {
        cards.truncate(limit);
    }

    print_cards(app, &cards, "All caught up! Use --fallback to study ahead.", format, use_color)
}

fn print_cards(
    app: &App,
    cards: &[Card],
    empty_message: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("{}", empty_message);
                return Ok(());
            }

            let threshold = app.config.graduation_threshold();
            println!("{}", render_card_table(cards, Utc::now(), &threshold, use_color));
            println!("\n{} card(s)", cards.len());
        }
    }

    Ok(())
}
