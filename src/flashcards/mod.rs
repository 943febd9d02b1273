//! Flashcard and spaced repetition system for Coin
//!
//! This module provides:
//! - SM-2 review scheduling (`algorithm`)
//! - Due-set selection and study ordering (`selector`)
//! - Duplicate detection for generated cards (`dedup`)
//! - Anki-importable CSV export (`export`)
//! - JSON-file persistence, review history and offline sync (`storage`)

pub mod algorithm;
pub mod clock;
pub mod dedup;
pub mod export;
pub mod models;
pub mod selector;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use export::{write_anki_csv, ExportError};
pub use models::*;
pub use selector::{GraduationThreshold, Schedulable, StudyPolicy};
pub use storage::{AddCardsReport, FlashcardStorage, FlashcardStorageError, SyncReport};
