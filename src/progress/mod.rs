//! Learning goals and milestone progression

pub mod models;
pub mod storage;
pub mod tracker;

pub use models::*;
pub use storage::{ProgressStorage, ProgressStorageError};
pub use tracker::{AssessmentOutcome, ProgressError, PASS_THRESHOLD};
