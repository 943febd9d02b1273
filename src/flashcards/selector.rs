//! Due-set selection and study ordering
//!
//! Decides which cards are due and in what order a learner sees them.
//! Due cards always come first; within each group cards are ordered by
//! ascending `next_review_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Card, SchedulingState};

/// Anything that carries a scheduling state
pub trait Schedulable {
    fn schedule(&self) -> &SchedulingState;
}

impl Schedulable for SchedulingState {
    fn schedule(&self) -> &SchedulingState {
        self
    }
}

impl Schedulable for Card {
    fn schedule(&self) -> &SchedulingState {
        &self.schedule
    }
}

impl<T: Schedulable> Schedulable for &T {
    fn schedule(&self) -> &SchedulingState {
        (*self).schedule()
    }
}

/// A card is due once its review time has arrived; equal counts as due
pub fn is_due(state: &SchedulingState, now: DateTime<Utc>) -> bool {
    state.next_review_at <= now
}

/// The due subset, in input order
pub fn due_cards<T: Schedulable>(cards: &[T], now: DateTime<Utc>) -> Vec<&T> {
    cards.iter().filter(|c| is_due(c.schedule(), now)).collect()
}

/// Every card, due ones first, then by ascending `next_review_at`
///
/// The sort is stable: cards with equal keys keep their input order.
pub fn study_queue<T: Schedulable>(cards: &[T], now: DateTime<Utc>) -> Vec<&T> {
    let mut queue: Vec<&T> = cards.iter().collect();
    queue.sort_by_key(|c| {
        let state = c.schedule();
        (!is_due(state, now), state.next_review_at)
    });
    queue
}

/// When a card counts as well retained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduationThreshold {
    pub interval_days: u32,
    pub repetitions: u32,
}

impl Default for GraduationThreshold {
    fn default() -> Self {
        Self {
            interval_days: 90,
            repetitions: 5,
        }
    }
}

/// Advisory only; graduated cards stay in every queue
pub fn should_graduate(state: &SchedulingState, threshold: &GraduationThreshold) -> bool {
    state.interval_days >= threshold.interval_days && state.repetitions >= threshold.repetitions
}

/// What to present when nothing is due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudyPolicy {
    /// Show due cards only; an empty result means "all caught up"
    #[default]
    DueOnly,
    /// With nothing due, study the whole collection in queue order
    FallbackToAll,
}

impl StudyPolicy {
    pub fn select<'a, T: Schedulable>(&self, cards: &'a [T], now: DateTime<Utc>) -> Vec<&'a T> {
        let queue = study_queue(cards, now);
        let due_count = queue.iter().take_while(|c| is_due(c.schedule(), now)).count();

        match self {
            StudyPolicy::FallbackToAll if due_count == 0 => queue,
            _ => queue.into_iter().take(due_count).collect(),
        }
    }
}

/// The card to show next under `policy`, if any
pub fn next_card<T: Schedulable>(cards: &[T], now: DateTime<Utc>, policy: StudyPolicy) -> Option<&T> {
    policy.select(cards, now).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn state_at(offset_hours: i64) -> SchedulingState {
        SchedulingState::new(now() + Duration::hours(offset_hours))
    }

    #[test]
    fn test_boundary_counts_as_due() {
        let states = vec![state_at(0), state_at(1), state_at(-1)];
        let due = due_cards(&states, now());

        assert_eq!(due.len(), 2);
        assert!(is_due(&states[0], now()));
        assert!(!is_due(&states[1], now()));
    }

    #[test]
    fn test_queue_puts_due_first_in_chronological_order() {
        let states = vec![state_at(48), state_at(-2), state_at(3), state_at(-30), state_at(0)];
        let queue = study_queue(&states, now());

        let offsets: Vec<i64> = queue
            .iter()
            .map(|s| (s.next_review_at - now()).num_hours())
            .collect();
        assert_eq!(offsets, vec![-30, -2, 0, 3, 48]);
    }

    #[test]
    fn test_queue_ordering_over_random_collections() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let states: Vec<SchedulingState> = (0..rng.gen_range(0..40))
                .map(|_| state_at(rng.gen_range(-72..72)))
                .collect();

            let queue = study_queue(&states, now());
            assert_eq!(queue.len(), states.len());

            let first_not_due = queue
                .iter()
                .position(|s| !is_due(s, now()))
                .unwrap_or(queue.len());
            assert!(queue[first_not_due..].iter().all(|s| !is_due(s, now())));
            assert!(queue[..first_not_due].iter().all(|s| is_due(s, now())));
            assert!(queue[..first_not_due]
                .windows(2)
                .all(|w| w[0].next_review_at <= w[1].next_review_at));
            assert!(queue[first_not_due..]
                .windows(2)
                .all(|w| w[0].next_review_at <= w[1].next_review_at));
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut a = state_at(-1);
        a.interval_days = 11;
        let mut b = state_at(-1);
        b.interval_days = 22;

        let states = vec![a, b];
        let queue = study_queue(&states, now());
        assert_eq!(queue[0].interval_days, 11);
        assert_eq!(queue[1].interval_days, 22);
    }

    #[test]
    fn test_graduation_threshold() {
        let mut state = state_at(0);
        state.interval_days = 90;
        state.repetitions = 5;
        assert!(should_graduate(&state, &GraduationThreshold::default()));

        state.repetitions = 4;
        assert!(!should_graduate(&state, &GraduationThreshold::default()));

        state.repetitions = 5;
        state.interval_days = 89;
        assert!(!should_graduate(&state, &GraduationThreshold::default()));

        let custom = GraduationThreshold {
            interval_days: 30,
            repetitions: 3,
        };
        state.repetitions = 3;
        assert!(should_graduate(&state, &custom));
    }

    #[test]
    fn test_policy_due_only_returns_nothing_when_caught_up() {
        let states = vec![state_at(5), state_at(2)];
        assert!(StudyPolicy::DueOnly.select(&states, now()).is_empty());
        assert!(next_card(&states, now(), StudyPolicy::DueOnly).is_none());
    }

    #[test]
    fn test_policy_fallback_returns_full_queue_when_caught_up() {
        let states = vec![state_at(5), state_at(2)];
        let selected = StudyPolicy::FallbackToAll.select(&states, now());

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].next_review_at, now() + Duration::hours(2));
    }

    #[test]
    fn test_policy_fallback_ignored_when_something_is_due() {
        let states = vec![state_at(5), state_at(-2), state_at(2)];
        let selected = StudyPolicy::FallbackToAll.select(&states, now());

        assert_eq!(selected.len(), 1);
        assert_eq!(
            next_card(&states, now(), StudyPolicy::FallbackToAll).map(|s| s.next_review_at),
            Some(now() - Duration::hours(2))
        );
    }
}
