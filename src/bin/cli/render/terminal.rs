use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use coin_lib::flashcards::{Card, GraduationThreshold, selector};

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Cut `text` to at most `max` display columns, adding an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.width() <= max {
        return single_line;
    }

    let mut out = String::new();
    for ch in single_line.chars() {
        // leave one column for the ellipsis
        if out.width() + ch.width().unwrap_or(0) + 1 > max {
            break;
        }
        out.push(ch);
    }
    out.push('\u{2026}');
    out
}

/// Relative due label: "due", "overdue 3d", "in 5d", "in 4h"
pub fn due_label(next_review_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = next_review_at - now;
    if delta.num_seconds() <= 0 {
        let overdue = -delta.num_days();
        if overdue >= 1 {
            format!("overdue {}d", overdue)
        } else {
            "due".to_string()
        }
    } else if delta.num_days() >= 1 {
        format!("in {}d", delta.num_days())
    } else if delta.num_hours() >= 1 {
        format!("in {}h", delta.num_hours())
    } else {
        format!("in {}m", delta.num_minutes().max(1))
    }
}

/// One table line per card: id, due label, interval, reps, factor, front
pub fn render_card_table(
    cards: &[Card],
    now: DateTime<Utc>,
    threshold: &GraduationThreshold,
    use_color: bool,
) -> String {
    let mut lines = Vec::with_capacity(cards.len() + 2);
    lines.push(format!(
        "{:<8}  {:<12}  {:>5}  {:>4}  {:>5}  {}",
        "Id", "Due", "Ivl", "Reps", "EF", "Front"
    ));
    lines.push(format!(
        "{}  {}  {}  {}  {}  {}",
        "\u{2500}".repeat(8),
        "\u{2500}".repeat(12),
        "\u{2500}".repeat(5),
        "\u{2500}".repeat(4),
        "\u{2500}".repeat(5),
        "\u{2500}".repeat(40)
    ));

    for card in cards {
        let state = &card.schedule;
        let label = due_label(state.next_review_at, now);
        let label = if selector::is_due(state, now) {
            paint(&format!("{:<12}", label), Color::YELLOW, use_color)
        } else {
            paint(&format!("{:<12}", label), Color::GRAY, use_color)
        };

        let mut front = truncate(&card.front, 40);
        if selector::should_graduate(state, threshold) {
            front.push(' ');
            front.push_str(&paint("[mastered]", Color::GREEN, use_color));
        }
        if card.sync.dirty {
            front.push(' ');
            front.push_str(&paint("*", Color::CYAN, use_color));
        }

        lines.push(format!(
            "{:<8}  {}  {:>4}d  {:>4}  {:>5.2}  {}",
            &card.id.to_string()[..8],
            label,
            state.interval_days,
            state.repetitions,
            state.strength_factor,
            front
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_due_label() {
        assert_eq!(due_label(now(), now()), "due");
        assert_eq!(due_label(now() - Duration::days(3), now()), "overdue 3d");
        assert_eq!(due_label(now() + Duration::days(5), now()), "in 5d");
        assert_eq!(due_label(now() + Duration::hours(4), now()), "in 4h");
        assert_eq!(due_label(now() + Duration::seconds(10), now()), "in 1m");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("multi\nline  text", 20), "multi line text");
        let cut = truncate("a fairly long question about lifetimes", 10);
        assert!(cut.ends_with('\u{2026}'));
        assert!(cut.width() <= 10);
    }

    #[test]
    fn test_paint_respects_color_flag() {
        assert_eq!(paint("x", Color::RED, false), "x");
        assert_eq!(paint("x", Color::RED, true), "\x1b[31mx\x1b[0m");
    }
}
