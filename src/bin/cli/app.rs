use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use coin_lib::config::{self, CoinConfig};
use coin_lib::flashcards::{Card, FlashcardStorage};
use coin_lib::progress::ProgressStorage;
use coin_lib::projects::project_slug;

/// Shared application state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub config: CoinConfig,
    pub storage: FlashcardStorage,
    pub progress: ProgressStorage,
}

impl App {
    /// Initialize from the resolved data directory
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = config::resolve_data_dir(data_dir)
            .context("Failed to get data directory")?;
        let config = CoinConfig::load(&data_dir)
            .context("Failed to load config")?;
        let storage = FlashcardStorage::new(data_dir.clone());
        let progress = ProgressStorage::new(data_dir.clone());

        log::debug!("Using data directory {:?}", data_dir);

        Ok(Self {
            data_dir,
            config,
            storage,
            progress,
        })
    }

    /// Slug for a project that may not exist yet
    pub fn project_for_write(&self, name: &str) -> String {
        project_slug(name)
    }

    /// Find an existing project by name (slug, then slug prefix)
    pub fn find_project(&self, name: &str) -> Result<String> {
        let projects = self.storage.list_projects()
            .context("Failed to list projects")?;

        let slug = project_slug(name);

        // Exact match first
        if projects.iter().any(|p| *p == slug) {
            return Ok(slug);
        }

        // Prefix match
        let matches: Vec<&String> = projects.iter()
            .filter(|p| p.starts_with(&slug))
            .collect();

        match matches.len() {
            0 if projects.is_empty() => bail!("No project matching '{}'. No projects yet; add cards first.", name),
            0 => bail!("No project matching '{}'. Available projects:\n{}", name,
                projects.iter().map(|p| format!("  - {}", p)).collect::<Vec<_>>().join("\n")),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous project name '{}'. Matches:\n{}", name,
                matches.iter().map(|p| format!("  - {}", p)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Find a card in a project by id or unique id prefix
    pub fn find_card(&self, project: &str, id: &str) -> Result<Card> {
        self.storage.find_card(project, id)
            .with_context(|| format!("Failed to find card '{}' in {}", id, project))
    }
}
