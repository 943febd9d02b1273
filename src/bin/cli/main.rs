mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coin-cli", about = "Spaced-repetition flashcards for your study projects", version)]
struct Cli {
    /// Data directory (default: $COIN_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List projects that have flashcards
    Projects,

    /// Add a single card to a project
    Add {
        /// Project title or slug (created if missing)
        project: String,
        /// Prompt side
        front: String,
        /// Answer side
        back: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Import generated cards from a JSON array of {front, back, tags}
    Import {
        /// Project title or slug (created if missing)
        project: String,
        /// JSON file path (use "-" to read from stdin)
        file: String,
    },

    /// List every card in a project
    List {
        /// Project name (prefix match)
        project: String,
    },

    /// List cards that are due now
    Due {
        /// Project name (prefix match)
        project: String,
    },

    /// Show the study queue
    Queue {
        /// Project name (prefix match)
        project: String,
        /// Fall back to the full collection when nothing is due
        #[arg(long)]
        fallback: bool,
        /// Maximum cards to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rate a card: again, hard, good, easy (or 0, 1, 3, 5)
    Review {
        /// Project name (prefix match)
        project: String,
        /// Card id or unique id prefix
        card: String,
        /// Quality rating
        rating: String,
    },

    /// Show the interval hint for each rating
    Preview {
        /// Project name (prefix match)
        project: String,
        /// Card id or unique id prefix
        card: String,
    },

    /// Show a card's review history
    History {
        /// Project name (prefix match)
        project: String,
        /// Card id or unique id prefix
        card: String,
    },

    /// Show review statistics
    Stats {
        /// Project name (prefix match)
        project: String,
    },

    /// Replay offline reviews from a JSON array of {cardId, quality, reviewedAt}
    Sync {
        /// Project name (prefix match)
        project: String,
        /// JSON file path (use "-" to read from stdin)
        file: String,
    },

    /// Clear the unsynced flag on cards
    MarkSynced {
        /// Project name (prefix match)
        project: String,
        /// Card ids or prefixes (default: every dirty card)
        cards: Vec<String>,
    },

    /// Export a project's cards as an Anki-importable CSV deck
    Export {
        /// Project name (prefix match)
        project: String,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Deck name shown in Anki (default: the project slug)
        #[arg(long)]
        deck: Option<String>,
    },

    /// Learning goal and milestone progress
    #[command(subcommand)]
    Goal(GoalCommand),

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum GoalCommand {
    /// Set a project's plan from a JSON {smartGoal, milestones: [{title, ...}]}
    Set {
        /// Project title or slug (created if missing)
        project: String,
        /// JSON file path (use "-" to read from stdin)
        file: String,
        /// Replace an existing plan and its progress
        #[arg(long)]
        force: bool,
    },

    /// Show milestones and progress
    Show {
        /// Project name (prefix match)
        project: String,
    },

    /// Start studying the current milestone
    Start {
        /// Project name (prefix match)
        project: String,
        /// Deck being studied (default: the project's exported deck name)
        #[arg(long)]
        deck: Option<String>,
    },

    /// Record an exam score (0.0-1.0) for the current milestone
    Assess {
        /// Project name (prefix match)
        project: String,
        /// Fraction of questions answered correctly
        #[arg(long)]
        score: f64,
        /// Comma-separated concepts answered correctly
        #[arg(long, value_delimiter = ',')]
        correct: Vec<String>,
        /// Comma-separated concepts missed
        #[arg(long, value_delimiter = ',')]
        missed: Vec<String>,
        /// Free-text feedback
        #[arg(long)]
        feedback: Option<String>,
        /// Record a starting diagnostic that does not gate progress
        #[arg(long)]
        baseline: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Set graduationIntervalDays, graduationRepetitions or studyPolicy
    Set {
        key: String,
        value: String,
    },
}

/// Read a file argument, treating "-" as stdin
fn read_input(path: &str) -> anyhow::Result<String> {
    use anyhow::Context;

    if path == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.data_dir.as_deref())?;

    match cli.command {
        Command::Projects => {
            commands::projects::run(&app, &cli.format, use_color)?;
        }
        Command::Add { project, front, back, tags } => {
            commands::add::run_add(&app, &project, front, back, tags.as_deref(), &cli.format)?;
        }
        Command::Import { project, file } => {
            let content = read_input(&file)?;
            commands::add::run_import(&app, &project, &content, &cli.format)?;
        }
        Command::List { project } => {
            commands::cards::run_list(&app, &project, &cli.format, use_color)?;
        }
        Command::Due { project } => {
            commands::cards::run_due(&app, &project, &cli.format, use_color)?;
        }
        Command::Queue { project, fallback, limit } => {
            commands::cards::run_queue(&app, &project, fallback, limit, &cli.format, use_color)?;
        }
        Command::Review { project, card, rating } => {
            commands::review::run_review(&app, &project, &card, &rating, &cli.format, use_color)?;
        }
        Command::Preview { project, card } => {
            commands::review::run_preview(&app, &project, &card, &cli.format)?;
        }
        Command::History { project, card } => {
            commands::history::run(&app, &project, &card, &cli.format)?;
        }
        Command::Stats { project } => {
            commands::stats::run(&app, &project, &cli.format)?;
        }
        Command::Sync { project, file } => {
            let content = read_input(&file)?;
            commands::sync::run_sync(&app, &project, &content, &cli.format)?;
        }
        Command::MarkSynced { project, cards } => {
            commands::sync::run_mark_synced(&app, &project, &cards, &cli.format)?;
        }
        Command::Export { project, output, deck } => {
            commands::export::run(&app, &project, output.as_deref(), deck.as_deref(), &cli.format)?;
        }
        Command::Goal(subcmd) => match subcmd {
            GoalCommand::Set { project, file, force } => {
                let content = read_input(&file)?;
                commands::goal::run_set(&app, &project, &content, force, &cli.format)?;
            }
            GoalCommand::Show { project } => {
                commands::goal::run_show(&app, &project, &cli.format, use_color)?;
            }
            GoalCommand::Start { project, deck } => {
                commands::goal::run_start(&app, &project, deck.as_deref(), &cli.format)?;
            }
            GoalCommand::Assess { project, score, correct, missed, feedback, baseline } => {
                let assessment = commands::goal::Assessment { score, correct, missed, feedback, baseline };
                commands::goal::run_assess(&app, &project, assessment, &cli.format, use_color)?;
            }
        },
        Command::Config(subcmd) => match subcmd {
            ConfigCommand::Show => {
                commands::config::run_show(&app, &cli.format)?;
            }
            ConfigCommand::Set { key, value } => {
                commands::config::run_set(&app, &key, &value, &cli.format)?;
            }
        },
    }

    Ok(())
}
