//! Milestone progression
//!
//! A learner works through a goal's milestones in order. Each milestone ends
//! with an exam: a score of at least `PASS_THRESHOLD` completes it, anything
//! lower sends the learner back to study for another round (remediation).
//! These functions only move the profile; persistence is the caller's job.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use super::models::{AssessmentResult, LearningGoal, Milestone, UserProfile};

/// Lowest exam score that completes a milestone
pub const PASS_THRESHOLD: f64 = 0.7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("Invalid assessment score {0}: expected a fraction between 0.0 and 1.0")]
    InvalidScore(f64),

    #[error("Every milestone in this goal is already complete")]
    GoalComplete,

    #[error("A learning goal needs at least one milestone")]
    NoMilestones,

    #[error("Milestone titles must not be empty")]
    EmptyMilestoneTitle,

    #[error("Duplicate milestone title '{0}'")]
    DuplicateMilestone(String),
}

/// What an exam did to the learner's position in the goal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AssessmentOutcome {
    /// The milestone is complete; `next` is `None` once the whole goal is done
    Passed { milestone: String, next: Option<String> },
    /// Score below the threshold; the milestone stays current
    NeedsRemediation { milestone: String },
}

/// First milestone, in plan order, that has not been passed
pub fn current_milestone<'a>(goal: &'a LearningGoal, profile: &UserProfile) -> Option<&'a Milestone> {
    goal.milestones
        .iter()
        .find(|m| !profile.completed_milestones.contains(&m.title))
}

pub fn is_complete(goal: &LearningGoal, profile: &UserProfile) -> bool {
    current_milestone(goal, profile).is_none()
}

/// Whether study for the current milestone is already underway
pub fn is_resuming(profile: &UserProfile) -> bool {
    profile.current_deck_path.is_some()
        && profile.current_milestone_index == profile.completed_milestones.len()
}

/// Begin (or restart) study of the current milestone with `deck_path`
pub fn start_milestone<'a>(
    goal: &'a LearningGoal,
    profile: &mut UserProfile,
    deck_path: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<&'a Milestone, ProgressError> {
    let milestone = current_milestone(goal, profile).ok_or(ProgressError::GoalComplete)?;

    profile.current_deck_path = Some(deck_path.into());
    profile.milestone_start_date = Some(now);

    log::info!("Started milestone '{}'", milestone.title);
    Ok(milestone)
}

/// When the suggested study window for the current milestone closes
pub fn study_ends_at(goal: &LearningGoal, profile: &UserProfile) -> Option<DateTime<Utc>> {
    let milestone = current_milestone(goal, profile)?;
    let started = profile.milestone_start_date?;
    started.checked_add_signed(Duration::days(i64::from(milestone.duration_days)))
}

fn check_score(score: f64) -> Result<(), ProgressError> {
    // NaN fails the range check too
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(ProgressError::InvalidScore(score))
    }
}

/// Record a diagnostic taken before any study; it never gates progression
pub fn record_baseline(profile: &mut UserProfile, result: AssessmentResult) -> Result<(), ProgressError> {
    check_score(result.score)?;
    log::debug!("Baseline assessment scored {:.2}", result.score);
    profile.assessment_history.push(result);
    Ok(())
}

/// Record an exam for the current milestone and apply the pass gate
///
/// Every valid result is appended to the history. A pass completes the
/// milestone and clears the active deck. A fail keeps the milestone current
/// and restarts its study window from the exam time.
pub fn record_assessment(
    goal: &LearningGoal,
    profile: &mut UserProfile,
    result: AssessmentResult,
) -> Result<AssessmentOutcome, ProgressError> {
    check_score(result.score)?;
    let milestone = current_milestone(goal, profile).ok_or(ProgressError::GoalComplete)?;

    let score = result.score;
    let taken_at = result.timestamp;
    profile.assessment_history.push(result);

    if score >= PASS_THRESHOLD {
        profile.completed_milestones.push(milestone.title.clone());
        profile.current_milestone_index += 1;
        profile.current_deck_path = None;
        profile.milestone_start_date = None;

        let next = current_milestone(goal, profile).map(|m| m.title.clone());
        log::info!("Passed milestone '{}' with {:.2}", milestone.title, score);

        Ok(AssessmentOutcome::Passed {
            milestone: milestone.title.clone(),
            next,
        })
    } else {
        profile.milestone_start_date = Some(taken_at);
        log::info!(
            "Milestone '{}' scored {:.2}, below {:.2}; remediation needed",
            milestone.title, score, PASS_THRESHOLD
        );

        Ok(AssessmentOutcome::NeedsRemediation {
            milestone: milestone.title.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn goal() -> LearningGoal {
        LearningGoal {
            original_request: "I want to learn discrete maths".to_string(),
            smart_goal: "Solve counting and graph problems in 9 days".to_string(),
            milestones: vec![
                Milestone::new("Logic"),
                Milestone::new("Counting"),
                Milestone::new("Graphs"),
            ],
            total_duration_days: 9,
        }
    }

    fn exam(score: f64) -> AssessmentResult {
        AssessmentResult::new(score, epoch())
    }

    #[test]
    fn test_passing_advances_through_every_milestone() {
        let goal = goal();
        let mut profile = UserProfile::default();

        assert_eq!(current_milestone(&goal, &profile).unwrap().title, "Logic");

        start_milestone(&goal, &mut profile, "decks/logic.csv", epoch()).unwrap();
        let outcome = record_assessment(&goal, &mut profile, exam(0.9)).unwrap();
        assert_eq!(outcome, AssessmentOutcome::Passed {
            milestone: "Logic".to_string(),
            next: Some("Counting".to_string()),
        });
        assert_eq!(profile.completed_milestones, vec!["Logic"]);
        assert_eq!(profile.current_milestone_index, 1);
        assert_eq!(profile.current_deck_path, None);
        assert_eq!(profile.milestone_start_date, None);

        record_assessment(&goal, &mut profile, exam(0.8)).unwrap();
        let last = record_assessment(&goal, &mut profile, exam(1.0)).unwrap();
        assert_eq!(last, AssessmentOutcome::Passed {
            milestone: "Graphs".to_string(),
            next: None,
        });

        assert!(is_complete(&goal, &profile));
        assert_eq!(profile.assessment_history.len(), 3);
        assert_eq!(
            record_assessment(&goal, &mut profile, exam(0.9)),
            Err(ProgressError::GoalComplete)
        );
        assert!(matches!(
            start_milestone(&goal, &mut profile, "decks/extra.csv", epoch()),
            Err(ProgressError::GoalComplete)
        ));
        assert_eq!(profile.assessment_history.len(), 3);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let goal = goal();

        let mut profile = UserProfile::default();
        let outcome = record_assessment(&goal, &mut profile, exam(PASS_THRESHOLD)).unwrap();
        assert!(matches!(outcome, AssessmentOutcome::Passed { .. }));

        let mut profile = UserProfile::default();
        let outcome = record_assessment(&goal, &mut profile, exam(0.69)).unwrap();
        assert_eq!(outcome, AssessmentOutcome::NeedsRemediation { milestone: "Logic".to_string() });
    }

    #[test]
    fn test_failing_keeps_milestone_and_restarts_window() {
        let goal = goal();
        let mut profile = UserProfile::default();
        start_milestone(&goal, &mut profile, "decks/logic.csv", epoch()).unwrap();

        let later = epoch() + Duration::days(3);
        let outcome = record_assessment(&goal, &mut profile, AssessmentResult::new(0.4, later)).unwrap();

        assert!(matches!(outcome, AssessmentOutcome::NeedsRemediation { .. }));
        assert!(profile.completed_milestones.is_empty());
        assert_eq!(profile.current_milestone_index, 0);
        assert_eq!(profile.current_deck_path.as_deref(), Some("decks/logic.csv"));
        assert_eq!(profile.milestone_start_date, Some(later));
        assert_eq!(profile.assessment_history.len(), 1);
        assert!(is_resuming(&profile));

        // A remediation deck replaces the old one
        start_milestone(&goal, &mut profile, "decks/logic_remediation.csv", later).unwrap();
        assert_eq!(profile.current_deck_path.as_deref(), Some("decks/logic_remediation.csv"));
    }

    #[test]
    fn test_invalid_scores_change_nothing() {
        let goal = goal();
        let mut profile = UserProfile::default();

        for score in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                record_assessment(&goal, &mut profile, exam(score)),
                Err(ProgressError::InvalidScore(_))
            ));
            assert!(matches!(
                record_baseline(&mut profile, exam(score)),
                Err(ProgressError::InvalidScore(_))
            ));
        }

        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn test_baseline_is_recorded_without_gating() {
        let goal = goal();
        let mut profile = UserProfile::default();

        record_baseline(&mut profile, exam(0.95)).unwrap();

        assert_eq!(profile.assessment_history.len(), 1);
        assert!(profile.completed_milestones.is_empty());
        assert_eq!(current_milestone(&goal, &profile).unwrap().title, "Logic");
    }

    #[test]
    fn test_resuming_and_study_window() {
        let goal = goal();
        let mut profile = UserProfile::default();
        assert!(!is_resuming(&profile));
        assert_eq!(study_ends_at(&goal, &profile), None);

        start_milestone(&goal, &mut profile, "decks/logic.csv", epoch()).unwrap();
        assert!(is_resuming(&profile));
        assert_eq!(study_ends_at(&goal, &profile), Some(epoch() + Duration::days(3)));

        // An index that disagrees with the completed list means the deck is stale
        profile.current_milestone_index = 2;
        assert!(!is_resuming(&profile));
    }

    #[test]
    fn test_completed_titles_are_matched_not_counted() {
        let goal = goal();
        let mut profile = UserProfile {
            completed_milestones: vec!["Counting".to_string()],
            ..UserProfile::default()
        };

        assert_eq!(current_milestone(&goal, &profile).unwrap().title, "Logic");
        record_assessment(&goal, &mut profile, exam(0.9)).unwrap();
        assert_eq!(current_milestone(&goal, &profile).unwrap().title, "Graphs");
    }

    #[test]
    fn test_outcome_json() {
        let passed = AssessmentOutcome::Passed {
            milestone: "Logic".to_string(),
            next: None,
        };
        let json = serde_json::to_value(&passed).unwrap();
        assert_eq!(json["outcome"], "passed");
        assert_eq!(json["milestone"], "Logic");
        assert!(json["next"].is_null());
    }
}
