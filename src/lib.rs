//! Spaced-repetition scheduling for a multi-week study curriculum.
//!
//! `flashcards::algorithm::update` reschedules a card after a review,
//! `flashcards::selector` decides what to show next, and
//! `flashcards::FlashcardStorage` keeps cards on disk for the CLI.
//! `progress` tracks a learner through a goal's milestones.

pub mod config;
pub mod flashcards;
pub mod progress;
pub mod projects;
