//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::algorithm::{self, INITIAL_STRENGTH_FACTOR, MIN_STRENGTH_FACTOR};

/// A rating outside the four accepted quality levels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualityError {
    #[error("Invalid quality rating {0}: expected one of 0 (again), 1 (hard), 3 (good), 5 (easy)")]
    InvalidQuality(i32),

    #[error("Unknown quality rating '{0}': expected again, hard, good or easy")]
    UnknownName(String),
}

/// How well the learner recalled a card
///
/// The numeric values sit on the SM-2 0-5 scale. Only these four levels are
/// accepted; anything else is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Quality {
    /// Failed recall
    Again = 0,
    /// Correct, high effort
    Hard = 1,
    /// Correct, normal effort
    Good = 3,
    /// Correct, trivial
    Easy = 5,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Again, Quality::Hard, Quality::Good, Quality::Easy];

    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Quality::Again => "again",
            Quality::Hard => "hard",
            Quality::Good => "good",
            Quality::Easy => "easy",
        }
    }

    /// Whether this rating advances the schedule
    pub fn is_passing(self) -> bool {
        self.value() >= algorithm::PASSING_QUALITY
    }
}

impl TryFrom<i32> for Quality {
    type Error = QualityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Again),
            1 => Ok(Quality::Hard),
            3 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            other => Err(QualityError::InvalidQuality(other)),
        }
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

impl FromStr for Quality {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i32>() {
            return Quality::try_from(value);
        }
        match trimmed.to_lowercase().as_str() {
            "again" => Ok(Quality::Again),
            "hard" => Ok(Quality::Hard),
            "good" => Ok(Quality::Good),
            "easy" => Ok(Quality::Easy),
            _ => Err(QualityError::UnknownName(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Memory-strength state of a card
///
/// Only `algorithm::update` produces new values of this type; callers store
/// whatever it returns and never patch individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// SM-2 ease factor, never below 1.3
    #[serde(
        default = "default_strength_factor",
        deserialize_with = "deserialize_strength_factor"
    )]
    pub strength_factor: f64,
    /// Days until the next review
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,
    /// Consecutive successful reviews since the last reset
    #[serde(default)]
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

fn default_strength_factor() -> f64 {
    INITIAL_STRENGTH_FACTOR
}

/// Stored factors below the floor are raised to it on load
fn deserialize_strength_factor<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let factor = f64::deserialize(deserializer)?;
    if factor.is_finite() {
        Ok(factor.max(MIN_STRENGTH_FACTOR))
    } else {
        Ok(INITIAL_STRENGTH_FACTOR)
    }
}

fn default_interval_days() -> u32 {
    1
}

impl SchedulingState {
    /// Fresh state for a card created at `created_at`; it is due immediately
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            strength_factor: INITIAL_STRENGTH_FACTOR,
            interval_days: 1,
            repetitions: 0,
            next_review_at: created_at,
            last_reviewed_at: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }
}

/// Unsynced-change tracking, owned by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    #[serde(default)]
    pub dirty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// A flashcard with prompt (front) and answer (back)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    /// Project slug the card belongs to
    pub project: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub schedule: SchedulingState,
    #[serde(default)]
    pub sync: SyncMetadata,
}

impl Card {
    pub fn new(project: impl Into<String>, front: String, back: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project: project.into(),
            front,
            back,
            tags: Vec::new(),
            created_at: now,
            schedule: SchedulingState::new(now),
            sync: SyncMetadata::default(),
        }
    }

    pub fn from_new(project: impl Into<String>, new_card: NewCard, now: DateTime<Utc>) -> Self {
        let mut card = Self::new(project, new_card.front, new_card.back, now);
        card.tags = new_card.tags;
        card
    }

    /// Record a review: swaps in the rescheduled state and marks the card dirty
    pub fn apply_review(&mut self, quality: Quality, now: DateTime<Utc>) {
        self.schedule = algorithm::update(&self.schedule, quality, now);
        self.sync.dirty = true;
    }
}

/// Card content as produced by a generator, before it gets an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            tags: Vec::new(),
        }
    }
}

/// A record of a single review attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    pub quality: Quality,
    /// Interval scheduled by this review (days)
    pub interval_days: u32,
    /// Strength factor after this review
    pub strength_factor: f64,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(card: &Card, quality: Quality, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id: card.id,
            quality,
            interval_days: card.schedule.interval_days,
            strength_factor: card.schedule.strength_factor,
            reviewed_at,
        }
    }
}

/// A review captured while offline, replayed on sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineReview {
    pub card_id: Uuid,
    /// Raw rating; validated when the review is applied
    pub quality: i32,
    pub reviewed_at: DateTime<Utc>,
}

/// Statistics for a project's cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    /// Never reviewed
    pub new_cards: usize,
    /// Reviewed, but reset to relearning
    pub learning_cards: usize,
    /// At least one consecutive success
    pub review_cards: usize,
    pub due_cards: usize,
    pub graduated_cards: usize,
    pub dirty_cards: usize,
}
