//! Learning goal and learner profile models

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tracker::ProgressError;

/// One stage of a learning plan, gated by an exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Unique within a goal; completion is tracked by title
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Suggested study time before the exam
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

fn default_duration_days() -> u32 {
    3
}

impl Milestone {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            concepts: Vec::new(),
            duration_days: default_duration_days(),
        }
    }
}

/// A learning plan: the learner's request and its ordered milestones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningGoal {
    #[serde(default)]
    pub original_request: String,
    pub smart_goal: String,
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub total_duration_days: u32,
}

impl LearningGoal {
    /// A goal needs at least one milestone and unique milestone titles
    pub fn validate(&self) -> Result<(), ProgressError> {
        if self.milestones.is_empty() {
            return Err(ProgressError::NoMilestones);
        }

        let mut seen = HashSet::new();
        for milestone in &self.milestones {
            let title = milestone.title.trim();
            if title.is_empty() {
                return Err(ProgressError::EmptyMilestoneTitle);
            }
            if !seen.insert(title) {
                return Err(ProgressError::DuplicateMilestone(title.to_string()));
            }
        }
        Ok(())
    }
}

/// Result of a diagnostic or milestone exam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    /// Fraction correct, 0.0 to 1.0
    pub score: f64,
    #[serde(default)]
    pub correct_concepts: Vec<String>,
    #[serde(default)]
    pub missed_concepts: Vec<String>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excelled_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_areas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AssessmentResult {
    pub fn new(score: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            score,
            correct_concepts: Vec::new(),
            missed_concepts: Vec::new(),
            feedback: String::new(),
            excelled_at: None,
            improvement_areas: None,
            challenges: None,
            timestamp,
        }
    }
}

/// Where a learner stands within a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default = "default_name")]
    pub name: String,
    /// Concept to mastery level (0.0 to 1.0)
    #[serde(default)]
    pub topic_mastery: BTreeMap<String, f64>,
    /// Titles of passed milestones, in the order they were passed
    #[serde(default)]
    pub completed_milestones: Vec<String>,
    #[serde(default)]
    pub current_milestone_index: usize,
    #[serde(default)]
    pub assessment_history: Vec<AssessmentResult>,
    /// Deck being studied for the current milestone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_deck_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_start_date: Option<DateTime<Utc>>,
}

fn default_name() -> String {
    "Learner".to_string()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: default_name(),
            topic_mastery: BTreeMap::new(),
            completed_milestones: Vec::new(),
            current_milestone_index: 0,
            assessment_history: Vec::new(),
            current_deck_path: None,
            milestone_start_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_json_fills_defaults() {
        let goal: LearningGoal = serde_json::from_str(r#"{
            "smartGoal": "Read Rust async code fluently in 9 days",
            "milestones": [
                { "title": "Futures", "concepts": ["poll", "wakers"] },
                { "title": "Executors", "durationDays": 4 }
            ]
        }"#).unwrap();

        assert_eq!(goal.milestones[0].duration_days, 3);
        assert_eq!(goal.milestones[0].concepts, vec!["poll", "wakers"]);
        assert_eq!(goal.milestones[1].duration_days, 4);
        assert!(goal.milestones[1].description.is_empty());
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn test_goal_validation() {
        let mut goal = LearningGoal {
            original_request: "learn rust".to_string(),
            smart_goal: "Learn Rust".to_string(),
            milestones: Vec::new(),
            total_duration_days: 6,
        };
        assert!(matches!(goal.validate(), Err(ProgressError::NoMilestones)));

        goal.milestones = vec![Milestone::new("Ownership"), Milestone::new(" ")];
        assert!(matches!(goal.validate(), Err(ProgressError::EmptyMilestoneTitle)));

        goal.milestones = vec![Milestone::new("Ownership"), Milestone::new("Ownership ")];
        assert!(matches!(
            goal.validate(),
            Err(ProgressError::DuplicateMilestone(title)) if title == "Ownership"
        ));
    }

    #[test]
    fn test_empty_profile_json_is_default() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, UserProfile::default());
        assert_eq!(profile.name, "Learner");

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("completedMilestones").is_some());
        assert!(json.get("currentDeckPath").is_none());
    }
}
