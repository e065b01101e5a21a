// ============================================
// src/scheduler.rs
// Spaced-repetition scheduling (ease / interval / due)
// ============================================

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WordwizError};

/// Milliseconds in one day. Intervals are stored in days, `due` in epoch ms.
pub const DAY_MS: i64 = 86_400_000;
/// Ease given to a card on its first review.
pub const INITIAL_EASE: f64 = 2.5;
/// Ease never drops below this.
pub const MIN_EASE: f64 = 1.3;

/// Recall quality of a single review, `0..=5`.
///
/// `0..=2` counts as a failure and `3..=5` as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(u8);

impl Grade {
    /// Wrong answer in the quiz.
    pub const AGAIN: Grade = Grade(1);
    pub const HARD: Grade = Grade(2);
    /// Flipping a flashcard.
    pub const GOOD: Grade = Grade(4);
    /// Right answer in the quiz.
    pub const EASY: Grade = Grade(5);

    /// Out-of-range grades are rejected rather than clamped.
    pub fn new(value: u8) -> Result<Self> {
        if value > 5 {
            return Err(WordwizError::InvalidGrade(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<u8> for Grade {
    type Error = WordwizError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

/// Review progress of one card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ReviewState {
    pub ease: f64,
    /// Days until the next review, always `>= 1`.
    pub interval: u64,
    /// Epoch milliseconds at which the card becomes reviewable again.
    pub due: i64,
    /// Consecutive successful reviews since the last failure.
    pub streak: u32,
}

impl ReviewState {
    /// State of a card that has never been graded.
    pub fn initial(now_ms: i64) -> Self {
        Self {
            ease: INITIAL_EASE,
            interval: 1,
            due: now_ms,
            streak: 0,
        }
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        self.due <= now_ms
    }
}

/// Change in ease for a grade: `+0.1` at 5, `-0.8` at 0.
pub fn ease_delta(grade: Grade) -> f64 {
    let miss = f64::from(5 - grade.value());
    0.1 - miss * (0.08 + miss * 0.02)
}

/// Computes the state that follows `state` after a review graded `grade` at `now_ms`.
///
/// A card with no state is treated as [`ReviewState::initial`]. Interval growth on
/// the third and later successes uses the ease from *before* this review; the ease
/// update happens afterwards and is clamped to [`MIN_EASE`].
pub fn schedule(state: Option<&ReviewState>, grade: Grade, now_ms: i64) -> ReviewState {
    let mut next = state.copied().unwrap_or_else(|| ReviewState::initial(now_ms));

    if grade.is_success() {
        next.streak = next.streak.saturating_add(1);
        next.interval = match next.streak {
            1 => 1,
            2 => 6,
            _ => grow_interval(next.interval, next.ease),
        };
    } else {
        next.interval = 1;
        next.streak = 0;
    }

    next.ease = (next.ease + ease_delta(grade)).max(MIN_EASE);
    next.due = due_after(now_ms, next.interval);

    debug!(
        grade = grade.value(),
        ease = next.ease,
        interval = next.interval,
        streak = next.streak,
        "scheduled review"
    );
    next
}

// `f64::round` rounds halves away from zero, so 2.5 -> 3 for these positive values.
fn grow_interval(interval: u64, ease: f64) -> u64 {
    let grown = (interval as f64 * ease).round();
    // float -> int casts saturate
    (grown as u64).max(1)
}

fn due_after(now_ms: i64, interval_days: u64) -> i64 {
    let days = i64::try_from(interval_days).unwrap_or(i64::MAX);
    now_ms.saturating_add(days.saturating_mul(DAY_MS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000_000;

    fn grade(v: u8) -> Grade {
        Grade::new(v).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rejects_grades_above_five() {
        assert!(matches!(Grade::new(6), Err(WordwizError::InvalidGrade(6))));
        assert!(Grade::try_from(255).is_err());
        assert_eq!(Grade::new(5).unwrap(), Grade::EASY);
    }

    #[test]
    fn ease_delta_extremes() {
        assert!(close(ease_delta(grade(5)), 0.1));
        assert!(close(ease_delta(grade(4)), 0.0));
        assert!(close(ease_delta(grade(3)), -0.14));
        assert!(close(ease_delta(grade(0)), -0.8));
    }

    #[test]
    fn first_success_is_one_day() {
        let st = schedule(None, Grade::GOOD, NOW);
        assert_eq!(st.interval, 1);
        assert_eq!(st.streak, 1);
        assert!(close(st.ease, 2.5));
        assert_eq!(st.due, NOW + DAY_MS);
    }

    #[test]
    fn three_easy_reviews_then_a_miss() {
        let s1 = schedule(None, grade(5), NOW);
        let s2 = schedule(Some(&s1), grade(5), NOW);
        let s3 = schedule(Some(&s2), grade(5), NOW);
        let s4 = schedule(Some(&s3), grade(1), NOW);

        assert_eq!((s1.interval, s1.streak), (1, 1));
        assert_eq!((s2.interval, s2.streak), (6, 2));
        assert!(close(s2.ease, 2.7));
        // interval growth uses the ease before the third update
        assert_eq!(s3.interval, (6.0 * s2.ease).round() as u64);
        assert_eq!(s3.interval, 16);
        assert_eq!(s3.streak, 3);
        assert_eq!((s4.interval, s4.streak), (1, 0));
        assert!(close(s4.ease, s3.ease + ease_delta(grade(1))));
        assert!(close(s4.ease, 2.8 - 0.54));
    }

    #[test]
    fn single_zero_grade_from_new() {
        let st = schedule(None, grade(0), NOW);
        assert_eq!(st.interval, 1);
        assert_eq!(st.streak, 0);
        assert!(close(st.ease, 1.7));
        assert_eq!(st.due, NOW + DAY_MS);
    }

    #[test]
    fn ease_clamps_after_update() {
        let floor = ReviewState {
            ease: MIN_EASE,
            interval: 3,
            due: NOW,
            streak: 0,
        };
        assert_eq!(schedule(Some(&floor), grade(0), NOW).ease, MIN_EASE);

        let near = ReviewState { ease: 1.35, ..floor };
        assert_eq!(schedule(Some(&near), grade(3), NOW).ease, MIN_EASE);
        assert!(close(schedule(Some(&near), grade(5), NOW).ease, 1.45));
    }

    #[test]
    fn half_interval_rounds_up() {
        // 5 * 2.5 = 12.5
        let st = ReviewState {
            ease: 2.5,
            interval: 5,
            due: NOW,
            streak: 2,
        };
        assert_eq!(schedule(Some(&st), grade(4), NOW).interval, 13);
    }

    #[test]
    fn huge_intervals_saturate_due() {
        let st = ReviewState {
            ease: 1e12,
            interval: u64::MAX / 2,
            due: NOW,
            streak: 9,
        };
        let next = schedule(Some(&st), grade(5), NOW);
        assert_eq!(next.interval, u64::MAX);
        assert_eq!(next.due, i64::MAX);
    }

    #[test]
    fn is_due_is_inclusive() {
        let st = ReviewState::initial(NOW);
        assert!(st.is_due(NOW));
        assert!(!st.is_due(NOW - 1));
    }

    fn any_state() -> impl Strategy<Value = ReviewState> {
        (1.3f64..5.0, 1u64..10_000, 0u32..50).prop_map(|(ease, interval, streak)| ReviewState {
            ease,
            interval,
            due: NOW,
            streak,
        })
    }

    proptest! {
        #[test]
        fn prop_reachable_states_keep_invariants(grades in prop::collection::vec(0u8..=5, 1..15)) {
            let mut st: Option<ReviewState> = None;
            let mut now = NOW;
            for g in grades {
                let next = schedule(st.as_ref(), grade(g), now);
                prop_assert!(next.ease >= MIN_EASE);
                prop_assert!(next.interval >= 1);
                prop_assert_eq!(next.due, now + next.interval as i64 * DAY_MS);
                st = Some(next);
                now += 1_000;
            }
        }

        #[test]
        fn prop_failure_resets_progress(st in any_state(), g in 0u8..3) {
            let next = schedule(Some(&st), grade(g), NOW);
            prop_assert_eq!(next.streak, 0);
            prop_assert_eq!(next.interval, 1);
            prop_assert!(next.ease >= MIN_EASE);
        }

        #[test]
        fn prop_success_increments_streak(st in any_state(), g in 3u8..=5) {
            let next = schedule(Some(&st), grade(g), NOW);
            prop_assert_eq!(next.streak, st.streak + 1);
            prop_assert!(next.interval >= 1);
        }

        #[test]
        fn prop_absent_equals_initial(g in 0u8..=5, now in 0i64..4_000_000_000_000) {
            let initial = ReviewState::initial(now);
            prop_assert_eq!(schedule(None, grade(g), now), schedule(Some(&initial), grade(g), now));
        }
    }
}
