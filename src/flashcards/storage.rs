//! Storage operations for flashcards
//!
//! Directory structure per project:
//! ```text
//! projects/{project-slug}/flashcards/
//! ├── cards/
//! │   └── {card-id}.json   # Card content, scheduling state and sync flags
//! └── reviews/
//!     └── {card-id}.json   # Review history for the card
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::dedup::dedup_new_cards;
use super::models::*;
use super::selector::{self, GraduationThreshold, StudyPolicy};
use crate::projects::is_valid_slug;

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid project name '{0}': expected a lowercase slug like 'learn_rust'")]
    InvalidProject(String),

    #[error("Ambiguous card id '{0}' matches {1} cards")]
    AmbiguousCard(String, usize),

    #[error(transparent)]
    InvalidQuality(#[from] QualityError),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

/// Outcome of adding a batch of generated cards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardsReport {
    pub added: Vec<Card>,
    pub duplicates: usize,
}

/// Outcome of replaying offline reviews
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub applied: usize,
    /// Older than the card's last review; skipped
    pub stale: usize,
    /// Unknown card or invalid rating
    pub rejected: usize,
}

/// Storage manager for flashcard operations
pub struct FlashcardStorage {
    /// Base data directory (e.g., ~/.local/share/coin)
    data_dir: PathBuf,
    clock: Arc<dyn Clock>,
    /// Serializes read-modify-write of card files
    write_lock: Mutex<()>,
}

impl FlashcardStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self::with_clock(data_dir, Arc::new(SystemClock))
    }

    pub fn with_clock(data_dir: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_dir,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Default data directory for the current user
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("coin"))
            .ok_or(FlashcardStorageError::DataDirNotFound)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    /// Get the flashcards directory for a project
    fn flashcards_dir(&self, project: &str) -> PathBuf {
        self.projects_dir().join(project).join("flashcards")
    }

    fn cards_dir(&self, project: &str) -> PathBuf {
        self.flashcards_dir(project).join("cards")
    }

    fn reviews_dir(&self, project: &str) -> PathBuf {
        self.flashcards_dir(project).join("reviews")
    }

    fn card_path(&self, project: &str, card_id: Uuid) -> PathBuf {
        self.cards_dir(project).join(format!("{}.json", card_id))
    }

    fn reviews_path(&self, project: &str, card_id: Uuid) -> PathBuf {
        self.reviews_dir(project).join(format!("{}.json", card_id))
    }

    /// Refuse project names that are not plain slugs; they become path segments
    fn check_project(project: &str) -> Result<()> {
        if is_valid_slug(project) {
            Ok(())
        } else {
            Err(FlashcardStorageError::InvalidProject(project.to_string()))
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Initialize flashcard storage for a project
    pub fn init(&self, project: &str) -> Result<()> {
        Self::check_project(project)?;
        fs::create_dir_all(self.cards_dir(project))?;
        fs::create_dir_all(self.reviews_dir(project))?;
        Ok(())
    }

    // ==================== Project Operations ====================

    /// List project slugs under the data directory
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let projects_dir = self.projects_dir();
        if !projects_dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in fs::read_dir(&projects_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() && is_valid_slug(&name) {
                projects.push(name);
            }
        }

        projects.sort();
        Ok(projects)
    }

    // ==================== Card Operations ====================

    /// List all cards in a project, oldest first
    pub fn list_cards(&self, project: &str) -> Result<Vec<Card>> {
        Self::check_project(project)?;
        let cards_dir = self.cards_dir(project);
        if !cards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut cards = Vec::new();
        for entry in fs::read_dir(&cards_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                let card: Card = serde_json::from_str(&content)?;
                cards.push(card);
            }
        }

        // read_dir order is unspecified
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(cards)
    }

    /// Get a specific card
    pub fn get_card(&self, project: &str, card_id: Uuid) -> Result<Card> {
        Self::check_project(project)?;
        let card_path = self.card_path(project, card_id);
        if !card_path.exists() {
            return Err(FlashcardStorageError::CardNotFound(card_id.to_string()));
        }

        let content = fs::read_to_string(&card_path)?;
        let card: Card = serde_json::from_str(&content)?;
        Ok(card)
    }

    /// Find a card by full id or unique id prefix
    pub fn find_card(&self, project: &str, id_prefix: &str) -> Result<Card> {
        if let Ok(id) = Uuid::parse_str(id_prefix) {
            return self.get_card(project, id);
        }

        let needle = id_prefix.to_lowercase();
        let mut matches: Vec<Card> = self
            .list_cards(project)?
            .into_iter()
            .filter(|c| c.id.to_string().starts_with(&needle))
            .collect();

        match matches.len() {
            0 => Err(FlashcardStorageError::CardNotFound(id_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(FlashcardStorageError::AmbiguousCard(id_prefix.to_string(), n)),
        }
    }

    fn write_card(&self, project: &str, card: &Card) -> Result<()> {
        let card_path = self.card_path(project, card.id);
        fs::write(&card_path, serde_json::to_string_pretty(card)?)?;
        Ok(())
    }

    /// Add generated cards, discarding fronts the project already has
    pub fn add_cards(&self, project: &str, incoming: Vec<NewCard>) -> Result<AddCardsReport> {
        self.init(project)?;
        let _guard = self.lock();

        let existing = self.list_cards(project)?;
        let (kept, duplicates) = dedup_new_cards(&existing, incoming);

        let now = self.clock.now();
        let mut added = Vec::with_capacity(kept.len());
        for new_card in kept {
            let card = Card::from_new(project, new_card, now);
            self.write_card(project, &card)?;
            added.push(card);
        }

        log::info!(
            "Added {} cards to project {} ({} duplicates discarded)",
            added.len(),
            project,
            duplicates
        );

        Ok(AddCardsReport { added, duplicates })
    }

    // ==================== Review Operations ====================

    /// Get the review history of a card, oldest first
    pub fn review_history(&self, project: &str, card_id: Uuid) -> Result<Vec<ReviewRecord>> {
        Self::check_project(project)?;
        let path = self.reviews_path(project, card_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let records: Vec<ReviewRecord> = serde_json::from_str(&content)?;
        Ok(records)
    }

    fn append_review(&self, project: &str, record: ReviewRecord) -> Result<()> {
        let mut records = self.review_history(project, record.card_id)?;
        let path = self.reviews_path(project, record.card_id);
        records.push(record);
        fs::write(&path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }

    /// Submit a review for a card
    ///
    /// `quality` is validated here; anything outside {0, 1, 3, 5} is refused
    /// before the scheduler runs.
    pub fn submit_review(&self, project: &str, card_id: Uuid, quality: i32) -> Result<Card> {
        let quality = Quality::try_from(quality)?;
        let _guard = self.lock();

        let mut card = self.get_card(project, card_id)?;
        let now = self.clock.now();
        self.apply_and_save(project, &mut card, quality, now)?;

        Ok(card)
    }

    fn apply_and_save(&self, project: &str, card: &mut Card, quality: Quality, now: chrono::DateTime<Utc>) -> Result<()> {
        let before = card.schedule.clone();
        card.apply_review(quality, now);

        log::debug!(
            "Card {} rated {}: interval {} -> {}, reps {} -> {}, factor {:.2} -> {:.2}",
            card.id,
            quality,
            before.interval_days,
            card.schedule.interval_days,
            before.repetitions,
            card.schedule.repetitions,
            before.strength_factor,
            card.schedule.strength_factor
        );

        self.write_card(project, card)?;
        self.append_review(project, ReviewRecord::new(card, quality, now))?;
        Ok(())
    }

    /// Get all due cards in a project, most overdue first
    pub fn due_cards(&self, project: &str) -> Result<Vec<Card>> {
        let cards = self.list_cards(project)?;
        let now = self.clock.now();

        Ok(selector::study_queue(&cards, now)
            .into_iter()
            .take_while(|c| selector::is_due(&c.schedule, now))
            .cloned()
            .collect())
    }

    /// Cards to study now, under the given fallback policy
    pub fn study_queue(&self, project: &str, policy: StudyPolicy) -> Result<Vec<Card>> {
        let cards = self.list_cards(project)?;
        let now = self.clock.now();

        Ok(policy.select(&cards, now).into_iter().cloned().collect())
    }

    /// Get review statistics for a project
    pub fn review_stats(&self, project: &str, threshold: &GraduationThreshold) -> Result<ReviewStats> {
        let cards = self.list_cards(project)?;
        let now = self.clock.now();

        let mut stats = ReviewStats {
            total_cards: cards.len(),
            ..ReviewStats::default()
        };

        for card in &cards {
            let state = &card.schedule;
            if state.is_new() {
                stats.new_cards += 1;
            } else if state.repetitions == 0 {
                stats.learning_cards += 1;
            } else {
                stats.review_cards += 1;
            }

            if selector::is_due(state, now) {
                stats.due_cards += 1;
            }
            if selector::should_graduate(state, threshold) {
                stats.graduated_cards += 1;
            }
            if card.sync.dirty {
                stats.dirty_cards += 1;
            }
        }

        Ok(stats)
    }

    // ==================== Sync Operations ====================

    /// Replay reviews recorded offline
    ///
    /// Reviews are applied oldest first, each at its own `reviewed_at`. A review
    /// that is not newer than the card's last review is stale and skipped.
    pub fn apply_offline_reviews(&self, project: &str, mut reviews: Vec<OfflineReview>) -> Result<SyncReport> {
        Self::check_project(project)?;
        reviews.sort_by_key(|r| r.reviewed_at);
        let _guard = self.lock();

        let mut report = SyncReport::default();
        for review in reviews {
            let quality = match Quality::try_from(review.quality) {
                Ok(q) => q,
                Err(e) => {
                    log::warn!("Rejected offline review for card {}: {}", review.card_id, e);
                    report.rejected += 1;
                    continue;
                }
            };

            let mut card = match self.get_card(project, review.card_id) {
                Ok(card) => card,
                Err(FlashcardStorageError::CardNotFound(_)) => {
                    log::warn!("Rejected offline review for unknown card {}", review.card_id);
                    report.rejected += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if card
                .schedule
                .last_reviewed_at
                .map_or(false, |last| review.reviewed_at <= last)
            {
                log::debug!("Skipping stale offline review for card {}", card.id);
                report.stale += 1;
                continue;
            }

            self.apply_and_save(project, &mut card, quality, review.reviewed_at)?;
            report.applied += 1;
        }

        log::info!(
            "Offline sync for {}: {} applied, {} stale, {} rejected",
            project,
            report.applied,
            report.stale,
            report.rejected
        );

        Ok(report)
    }

    /// Cards with local changes not yet synced
    pub fn dirty_cards(&self, project: &str) -> Result<Vec<Card>> {
        Ok(self
            .list_cards(project)?
            .into_iter()
            .filter(|c| c.sync.dirty)
            .collect())
    }

    /// Clear the dirty flag on the given cards; returns how many were updated
    pub fn mark_synced(&self, project: &str, card_ids: &[Uuid]) -> Result<usize> {
        let _guard = self.lock();
        let now = self.clock.now();

        // Load everything first so an unknown id leaves every card untouched
        let cards = card_ids
            .iter()
            .map(|&card_id| self.get_card(project, card_id))
            .collect::<Result<Vec<_>>>()?;

        for mut card in cards.iter().cloned() {
            card.sync.dirty = false;
            card.sync.last_synced_at = Some(now);
            self.write_card(project, &card)?;
        }

        Ok(cards.len())
    }
}
