use anyhow::{Context, Result, bail};
use chrono::Utc;

use coin_lib::progress::{
    tracker, AssessmentOutcome, AssessmentResult, LearningGoal, PASS_THRESHOLD, UserProfile,
};

use crate::app::App;
use crate::render::terminal::{Color, paint};
use crate::OutputFormat;

/// Exam details gathered from the command line
pub struct Assessment {
    pub score: f64,
    pub correct: Vec<String>,
    pub missed: Vec<String>,
    pub feedback: Option<String>,
    pub baseline: bool,
}

pub fn run_set(app: &App, project_name: &str, content: &str, force: bool, format: &OutputFormat) -> Result<()> {
    let project = app.project_for_write(project_name);
    let goal: LearningGoal = serde_json::from_str(content)
        .context("Expected a JSON object with \"smartGoal\" and \"milestones\" [{\"title\", ...}]")?;

    if !force && app.progress.has_goal(&project)? {
        bail!("{} already has a learning goal. Use --force to replace it and reset progress.", project);
    }

    app.progress.set_goal(&project, &goal)
        .with_context(|| format!("Failed to save learning goal for {}", project))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "project": project,
                "goal": goal,
            }))?);
        }
        OutputFormat::Plain => {
            println!("Plan saved for {}: {}", project, goal.smart_goal);
            for (i, milestone) in goal.milestones.iter().enumerate() {
                println!("  {}. {} ({} days)", i + 1, milestone.title, milestone.duration_days);
            }
        }
    }

    Ok(())
}

pub fn run_show(app: &App, project_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let project = app.find_project(project_name)?;
    let goal = app.progress.get_goal(&project)?;
    let profile = app.progress.load_profile(&project)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "project": project,
                "goal": goal,
                "profile": profile,
                "currentMilestone": tracker::current_milestone(&goal, &profile).map(|m| &m.title),
                "studyEndsAt": tracker::study_ends_at(&goal, &profile),
            }))?);
        }
        OutputFormat::Plain => print_progress(&project, &goal, &profile, use_color),
    }

    Ok(())
}

fn print_progress(project: &str, goal: &LearningGoal, profile: &UserProfile, use_color: bool) {
    println!("{}: {}", project, goal.smart_goal);

    let current = tracker::current_milestone(goal, profile).map(|m| m.title.as_str());
    for (i, milestone) in goal.milestones.iter().enumerate() {
        let marker = if profile.completed_milestones.contains(&milestone.title) {
            paint("[passed]", Color::GREEN, use_color)
        } else if current == Some(milestone.title.as_str()) {
            paint("[current]", Color::YELLOW, use_color)
        } else {
            "[ ]".to_string()
        };
        println!("  {}. {} {}", i + 1, milestone.title, marker);
    }

    if tracker::is_complete(goal, profile) {
        println!("All milestones complete.");
    } else if tracker::is_resuming(profile) {
        if let Some(deck) = &profile.current_deck_path {
            println!("Studying deck {}", deck);
        }
        if let Some(ends) = tracker::study_ends_at(goal, profile) {
            println!("Exam suggested after {}", ends.format("%Y-%m-%d"));
        }
    }

    if let Some(last) = profile.assessment_history.last() {
        println!("Last assessment: {:.0}% on {}", last.score * 100.0, last.timestamp.format("%Y-%m-%d"));
    }
}

pub fn run_start(app: &App, project_name: &str, deck: Option<&str>, format: &OutputFormat) -> Result<()> {
    let project = app.find_project(project_name)?;
    let default_deck = format!("{}.csv", project);
    let deck = deck.unwrap_or(&default_deck);

    let (milestone, profile) = app.progress.start_milestone(&project, deck)
        .with_context(|| format!("Failed to start a milestone in {}", project))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "project": project,
                "milestone": milestone,
                "profile": profile,
            }))?);
        }
        OutputFormat::Plain => {
            println!("Started '{}' with deck {}", milestone.title, deck);
            println!("Study for {} days, then record your exam with `coin-cli goal assess`.", milestone.duration_days);
        }
    }

    Ok(())
}

pub fn run_assess(
    app: &App,
    project_name: &str,
    assessment: Assessment,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let project = app.find_project(project_name)?;

    let mut result = AssessmentResult::new(assessment.score, Utc::now());
    result.correct_concepts = assessment.correct;
    result.missed_concepts = assessment.missed;
    result.feedback = assessment.feedback.unwrap_or_default();

    if assessment.baseline {
        let profile = app.progress.record_baseline(&project, result)?;
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
            OutputFormat::Plain => {
                println!("Baseline recorded: {:.0}%", assessment.score * 100.0);
            }
        }
        return Ok(());
    }

    let (outcome, profile) = app.progress.record_assessment(&project, result)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "outcome": outcome,
                "profile": profile,
            }))?);
        }
        OutputFormat::Plain => match outcome {
            AssessmentOutcome::Passed { milestone, next } => {
                println!("{} '{}' with {:.0}%", paint("Passed", Color::GREEN, use_color), milestone, assessment.score * 100.0);
                match next {
                    Some(next) => println!("Next milestone: {}", next),
                    None => println!("Every milestone in this goal is complete."),
                }
            }
            AssessmentOutcome::NeedsRemediation { milestone } => {
                println!(
                    "{} {:.0}% is below the {:.0}% needed for '{}'",
                    paint("Not yet:", Color::YELLOW, use_color),
                    assessment.score * 100.0,
                    PASS_THRESHOLD * 100.0,
                    milestone,
                );
                println!("Review the missed concepts, then start a remediation deck with `coin-cli goal start --deck <file>`.");
            }
        },
    }

    Ok(())
}
