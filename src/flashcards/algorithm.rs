//! SM-2 Spaced Repetition Algorithm
//!
//! Given a card's scheduling state and a quality rating, computes the
//! next interval, the adjusted strength (ease) factor and the next due date.
//!
//! Quality ratings:
//! - 0 (Again): failed recall
//! - 1 (Hard): correct with high effort
//! - 3 (Good): correct with normal effort
//! - 5 (Easy): correct, trivial
//!
//! Only ratings of 3 or above advance the schedule. Again and Hard both reset
//! the card to relearning.

use chrono::{DateTime, Duration, Utc};

use super::models::{Quality, SchedulingState};

/// Minimum strength factor allowed
pub const MIN_STRENGTH_FACTOR: f64 = 1.3;

/// Strength factor of a card that has never been reviewed
pub const INITIAL_STRENGTH_FACTOR: f64 = 2.5;

/// Lowest quality value that counts as a successful recall
pub const PASSING_QUALITY: i32 = 3;

/// Interval after the second consecutive success
const SECOND_INTERVAL_DAYS: u32 = 6;

/// Compute the scheduling state that follows a review
///
/// Pure and deterministic: the result depends only on `state`, `quality`
/// and `now`. Calling it twice advances the schedule twice.
pub fn update(state: &SchedulingState, quality: Quality, now: DateTime<Utc>) -> SchedulingState {
    let (interval_days, repetitions) = if quality.is_passing() {
        let interval = match state.repetitions {
            0 => 1,
            1 => SECOND_INTERVAL_DAYS,
            // Scale by the factor from before this review
            _ => grow_interval(state.interval_days, state.strength_factor),
        };
        (interval, state.repetitions.saturating_add(1))
    } else {
        (1, 0)
    };

    SchedulingState {
        strength_factor: next_strength_factor(state.strength_factor, quality),
        interval_days,
        repetitions,
        next_review_at: add_days(now, interval_days),
        last_reviewed_at: Some(now),
    }
}

/// EF' = max(1.3, EF + 0.1 - (5-q) * (0.08 + (5-q) * 0.02))
///
/// Applied on every review, resets included.
pub fn next_strength_factor(factor: f64, quality: Quality) -> f64 {
    let miss = f64::from(5 - quality.value());
    (factor + 0.1 - miss * (0.08 + miss * 0.02)).max(MIN_STRENGTH_FACTOR)
}

fn grow_interval(interval_days: u32, factor: f64) -> u32 {
    // `as` saturates at u32::MAX for absurdly long schedules
    (f64::from(interval_days) * factor).round() as u32
}

fn add_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Short interval hint for a rating button, e.g. "~6d"
///
/// Runs the update on a throwaway copy with repetitions pinned to 1, so the
/// caller's state is never touched.
pub fn interval_preview(state: &SchedulingState, quality: Quality, now: DateTime<Utc>) -> String {
    let mut scratch = state.clone();
    scratch.repetitions = 1;
    format_interval(update(&scratch, quality, now).interval_days)
}

/// Preview hints for all four ratings, in ascending quality order
pub fn preview_all(state: &SchedulingState, now: DateTime<Utc>) -> [(Quality, String); 4] {
    Quality::ALL.map(|quality| (quality, interval_preview(state, quality, now)))
}

/// Format an interval in days into a coarse human-readable bucket
pub fn format_interval(days: u32) -> String {
    if days < 1 {
        "~10min".to_string()
    } else if days < 7 {
        format!("~{}d", days)
    } else if days < 30 {
        format!("~{}w", days / 7)
    } else {
        format!("~{}mo", days / 30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn fresh() -> SchedulingState {
        SchedulingState::new(epoch())
    }

    fn random_quality(rng: &mut StdRng) -> Quality {
        Quality::ALL[rng.gen_range(0..Quality::ALL.len())]
    }

    #[test]
    fn test_first_and_second_success_intervals() {
        let first = update(&fresh(), Quality::Good, epoch());
        assert_eq!(first.interval_days, 1);
        assert_eq!(first.repetitions, 1);

        let second = update(&first, Quality::Good, epoch());
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.repetitions, 2);
    }

    #[test]
    fn test_subsequent_success_scales_by_prior_factor() {
        let state = SchedulingState {
            strength_factor: 2.5,
            interval_days: 10,
            repetitions: 5,
            ..fresh()
        };

        let result = update(&state, Quality::Good, epoch());

        // 10 * 2.5, not 10 * the factor computed by this review
        assert_eq!(result.interval_days, 25);
        assert_eq!(result.repetitions, 6);
    }

    #[test]
    fn test_hard_resets_like_again() {
        let state = SchedulingState {
            strength_factor: 2.5,
            interval_days: 30,
            repetitions: 4,
            ..fresh()
        };

        for quality in [Quality::Again, Quality::Hard] {
            let result = update(&state, quality, epoch());
            assert_eq!(result.interval_days, 1);
            assert_eq!(result.repetitions, 0);
            assert!(result.strength_factor < state.strength_factor);
        }
    }

    #[test]
    fn test_strength_factor_formula() {
        assert!((next_strength_factor(2.5, Quality::Easy) - 2.6).abs() < 1e-9);
        assert!((next_strength_factor(2.5, Quality::Good) - 2.36).abs() < 1e-9);
        assert!((next_strength_factor(2.5, Quality::Hard) - 1.96).abs() < 1e-9);
        assert!((next_strength_factor(2.5, Quality::Again) - 1.7).abs() < 1e-9);
        assert_eq!(next_strength_factor(1.4, Quality::Again), MIN_STRENGTH_FACTOR);
    }

    #[test]
    fn test_timestamps_follow_interval() {
        let state = SchedulingState {
            interval_days: 6,
            repetitions: 2,
            ..fresh()
        };
        let now = epoch() + Duration::hours(5);

        let result = update(&state, Quality::Good, now);

        assert_eq!(result.last_reviewed_at, Some(now));
        assert_eq!(result.next_review_at, now + Duration::days(i64::from(result.interval_days)));
    }

    #[test]
    fn test_end_to_end_review_sequence() {
        let now = epoch();
        let state = fresh();

        let s1 = update(&state, Quality::Good, now);
        assert_eq!((s1.interval_days, s1.repetitions), (1, 1));

        let s2 = update(&s1, Quality::Good, now);
        assert_eq!((s2.interval_days, s2.repetitions), (6, 2));

        let s3 = update(&s2, Quality::Good, now);
        let expected = (6.0 * s2.strength_factor).round() as u32;
        assert_eq!(s3.interval_days, expected);
        assert_eq!(s3.interval_days, 13);
        assert_eq!(s3.repetitions, 3);

        let s4 = update(&s3, Quality::Again, now);
        assert_eq!((s4.interval_days, s4.repetitions), (1, 0));
        assert!(s4.strength_factor < s3.strength_factor);
        assert!(s4.strength_factor >= MIN_STRENGTH_FACTOR);
    }

    #[test]
    fn test_factor_floor_holds_for_random_sequences() {
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = fresh();
            let mut now = epoch();
            for _ in 0..12 {
                state = update(&state, random_quality(&mut rng), now);
                assert!(state.strength_factor >= MIN_STRENGTH_FACTOR, "seed {}", seed);
                if state.repetitions == 0 {
                    assert_eq!(state.interval_days, 1, "seed {}", seed);
                } else {
                    assert!(state.interval_days >= 1, "seed {}", seed);
                }
                now = state.next_review_at;
            }
        }
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let state = SchedulingState {
                strength_factor: rng.gen_range(1.3..4.0),
                interval_days: rng.gen_range(1..400),
                repetitions: rng.gen_range(0..20),
                ..fresh()
            };
            let result = update(&state, Quality::Again, epoch());
            assert_eq!(result.repetitions, 0);
            assert_eq!(result.interval_days, 1);
        }
    }

    #[test]
    fn test_growth_is_rounded_product_and_non_decreasing() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let state = SchedulingState {
                strength_factor: rng.gen_range(1.3..4.0),
                interval_days: rng.gen_range(1..400),
                repetitions: rng.gen_range(2..20),
                ..fresh()
            };
            for quality in [Quality::Good, Quality::Easy] {
                let result = update(&state, quality, epoch());
                let expected = (f64::from(state.interval_days) * state.strength_factor).round() as u32;
                assert_eq!(result.interval_days, expected);
                assert!(result.interval_days >= state.interval_days);
            }
        }
    }

    #[test]
    fn test_update_does_not_touch_input() {
        let state = fresh();
        let snapshot = state.clone();
        let _ = update(&state, Quality::Easy, epoch());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_huge_interval_saturates_instead_of_panicking() {
        let state = SchedulingState {
            strength_factor: 5.0,
            interval_days: u32::MAX / 2,
            repetitions: 30,
            ..fresh()
        };
        let result = update(&state, Quality::Easy, epoch());
        assert_eq!(result.interval_days, u32::MAX);
        assert_eq!(result.next_review_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_repetitions_saturate() {
        let state = SchedulingState {
            interval_days: 10,
            repetitions: u32::MAX,
            ..fresh()
        };
        let result = update(&state, Quality::Good, epoch());
        assert_eq!(result.repetitions, u32::MAX);
        assert_eq!(result.interval_days, 25);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "~10min");
        assert_eq!(format_interval(1), "~1d");
        assert_eq!(format_interval(6), "~6d");
        assert_eq!(format_interval(7), "~1w");
        assert_eq!(format_interval(29), "~4w");
        assert_eq!(format_interval(30), "~1mo");
        assert_eq!(format_interval(95), "~3mo");
    }

    #[test]
    fn test_preview_pins_repetitions_to_one() {
        let state = SchedulingState {
            strength_factor: 2.5,
            interval_days: 40,
            repetitions: 7,
            ..fresh()
        };
        let snapshot = state.clone();

        assert_eq!(interval_preview(&state, Quality::Again, epoch()), "~1d");
        assert_eq!(interval_preview(&state, Quality::Hard, epoch()), "~1d");
        assert_eq!(interval_preview(&state, Quality::Good, epoch()), "~6d");
        assert_eq!(interval_preview(&state, Quality::Easy, epoch()), "~6d");
        assert_eq!(state, snapshot);

        let all = preview_all(&state, epoch());
        assert_eq!(all[0], (Quality::Again, "~1d".to_string()));
        assert_eq!(all[3], (Quality::Easy, "~6d".to_string()));
    }
}
