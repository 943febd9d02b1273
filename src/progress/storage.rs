//! Storage for learning goals and learner profiles
//!
//! Files per project, next to the project's flashcards:
//! ```text
//! projects/{project-slug}/
//! ├── learning_goal.json   # The plan and its milestones
//! └── user_profile.json    # Progress through the plan
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use super::models::*;
use super::tracker::{self, AssessmentOutcome, ProgressError};
use crate::flashcards::{Clock, SystemClock};
use crate::projects::is_valid_slug;

#[derive(Error, Debug)]
pub enum ProgressStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid project name '{0}': expected a lowercase slug like 'learn_rust'")]
    InvalidProject(String),

    #[error("No learning goal set for project '{0}'")]
    GoalNotFound(String),

    #[error(transparent)]
    Progress(#[from] ProgressError),
}

pub type Result<T> = std::result::Result<T, ProgressStorageError>;

const GOAL_FILE: &str = "learning_goal.json";
const PROFILE_FILE: &str = "user_profile.json";

/// Storage manager for goals and milestone progress
pub struct ProgressStorage {
    data_dir: PathBuf,
    clock: Arc<dyn Clock>,
    /// Serializes read-modify-write of profile files
    write_lock: Mutex<()>,
}

impl ProgressStorage {
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

    fn project_dir(&self, project: &str) -> Result<PathBuf> {
        if !is_valid_slug(project) {
            return Err(ProgressStorageError::InvalidProject(project.to_string()));
        }
        Ok(self.data_dir.join("projects").join(project))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the goal for a project
    pub fn get_goal(&self, project: &str) -> Result<LearningGoal> {
        let path = self.project_dir(project)?.join(GOAL_FILE);
        if !path.exists() {
            return Err(ProgressStorageError::GoalNotFound(project.to_string()));
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn has_goal(&self, project: &str) -> Result<bool> {
        Ok(self.project_dir(project)?.join(GOAL_FILE).exists())
    }

    /// Save a new plan for a project and start the learner from scratch
    pub fn set_goal(&self, project: &str, goal: &LearningGoal) -> Result<UserProfile> {
        goal.validate()?;
        let dir = self.project_dir(project)?;
        let _guard = self.lock();

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(GOAL_FILE), serde_json::to_string_pretty(goal)?)?;

        let profile = UserProfile::default();
        self.write_profile(project, &profile)?;

        log::info!("Saved learning goal for {} ({} milestones)", project, goal.milestones.len());
        Ok(profile)
    }

    /// Load the learner profile, or a fresh one if none is stored
    pub fn load_profile(&self, project: &str) -> Result<UserProfile> {
        let path = self.project_dir(project)?.join(PROFILE_FILE);
        if !path.exists() {
            return Ok(UserProfile::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_profile(&self, project: &str, profile: &UserProfile) -> Result<()> {
        let dir = self.project_dir(project)?;
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(PROFILE_FILE), serde_json::to_string_pretty(profile)?)?;
        Ok(())
    }

    /// Begin study of the current milestone with the given deck
    pub fn start_milestone(&self, project: &str, deck_path: &str) -> Result<(Milestone, UserProfile)> {
        let goal = self.get_goal(project)?;
        let _guard = self.lock();
        let mut profile = self.load_profile(project)?;

        let milestone = tracker::start_milestone(&goal, &mut profile, deck_path, self.clock.now())?.clone();
        self.write_profile(project, &profile)?;

        Ok((milestone, profile))
    }

    /// Record a diagnostic result without gating
    pub fn record_baseline(&self, project: &str, result: AssessmentResult) -> Result<UserProfile> {
        // Baselines only make sense against a plan
        self.get_goal(project)?;
        let _guard = self.lock();
        let mut profile = self.load_profile(project)?;

        tracker::record_baseline(&mut profile, result)?;
        self.write_profile(project, &profile)?;

        Ok(profile)
    }

    /// Record a milestone exam and persist the resulting progress
    pub fn record_assessment(
        &self,
        project: &str,
        result: AssessmentResult,
    ) -> Result<(AssessmentOutcome, UserProfile)> {
        let goal = self.get_goal(project)?;
        let _guard = self.lock();
        let mut profile = self.load_profile(project)?;

        let outcome = tracker::record_assessment(&goal, &mut profile, result)?;
        self.write_profile(project, &profile)?;

        Ok((outcome, profile))
    }
}
