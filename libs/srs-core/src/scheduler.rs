//! SM-2 family spaced repetition scheduler.
//!
//! Every operation is pure: callers pass in the current state (or `None` for
//! an item that has never been reviewed) and the current time, and persist
//! whatever comes back.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::types::{
    Performance, ReviewState, ReviewStatus, DEFAULT_EASE, DEFAULT_INTERVAL, MINIMUM_EASE,
    MS_PER_DAY,
};

/// Scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub again_penalty: f64,
    pub hard_penalty: f64,
    pub easy_reward: f64,
    pub hard_multiplier: f64,
    pub easy_bonus: f64,
    pub graduating_interval: u32,
    pub second_interval: u32,
    pub easy_interval: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            initial_ease: DEFAULT_EASE,
            minimum_ease: MINIMUM_EASE,
            again_penalty: 0.2,
            hard_penalty: 0.15,
            easy_reward: 0.15,
            hard_multiplier: 1.2,
            easy_bonus: 1.3,
            graduating_interval: 1,
            second_interval: 6,
            easy_interval: 4,
        }
    }
}

impl Scheduler {
    /// Apply a grade to an item and return its next review state.
    pub fn grade(
        &self,
        current: Option<&ReviewState>,
        performance: Performance,
        now: DateTime<Utc>,
    ) -> ReviewState {
        let (interval, ease, repetitions) = match current {
            Some(state) => (state.interval(), state.ease_factor(), state.repetitions()),
            None => (DEFAULT_INTERVAL, self.initial_ease, 0),
        };

        let (new_interval, new_ease, new_repetitions) = match performance {
            Performance::Again => (1, self.floor(ease - self.again_penalty), 0),
            Performance::Hard => (
                round_interval(f64::from(interval) * self.hard_multiplier),
                self.floor(ease - self.hard_penalty),
                repetitions.saturating_add(1),
            ),
            Performance::Good => {
                let reps = repetitions.saturating_add(1);
                let next = match reps {
                    1 => self.graduating_interval,
                    2 => self.second_interval,
                    _ => round_interval(f64::from(interval) * ease),
                };
                (next, ease, reps)
            }
            Performance::Easy => {
                let reps = repetitions.saturating_add(1);
                let next = if reps == 1 {
                    self.easy_interval
                } else {
                    round_interval(f64::from(interval) * ease * self.easy_bonus)
                };
                // No upper cap on the ease factor.
                (next, ease + self.easy_reward, reps)
            }
        };

        ReviewState::new(
            new_interval.max(1),
            new_ease,
            new_repetitions,
            now,
            Some(performance),
        )
    }

    /// New items are always due; reviewed items once `next_review_at <= now`.
    pub fn is_due(&self, state: Option<&ReviewState>, now: DateTime<Utc>) -> bool {
        match state {
            Some(state) => state.next_review_at() <= now,
            None => true,
        }
    }

    /// Order items for presentation: new first, then most overdue, then
    /// lowest ease. The sort is stable, so anything the rules leave tied
    /// keeps its input order.
    pub fn prioritize<'a, T, I, F>(&self, items: I, lookup: F, now: DateTime<Utc>) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> Option<&'a ReviewState>,
    {
        let mut ranked: Vec<(T, Option<&'a ReviewState>)> = items
            .into_iter()
            .map(|item| {
                let state = lookup(&item);
                (item, state)
            })
            .collect();

        ranked.sort_by(|(_, a), (_, b)| compare_priority(*a, *b, now));
        ranked.into_iter().map(|(item, _)| item).collect()
    }

    /// Display projection of an item's state.
    pub fn describe_status(&self, state: Option<&ReviewState>, now: DateTime<Utc>) -> ReviewStatus {
        match state {
            Some(state) => ReviewStatus {
                is_new: false,
                is_due: self.is_due(Some(state), now),
                days_until_due: days_until(state.next_review_at(), now),
                repetitions: state.repetitions(),
                ease_factor: state.ease_factor(),
                last_performance: state.last_performance(),
            },
            None => ReviewStatus {
                is_new: true,
                is_due: true,
                days_until_due: 0,
                repetitions: 0,
                ease_factor: self.initial_ease,
                last_performance: None,
            },
        }
    }

    fn floor(&self, ease: f64) -> f64 {
        ease.max(self.minimum_ease)
    }
}

fn round_interval(days: f64) -> u32 {
    // Float to int casts saturate, so runaway Easy streaks top out at u32::MAX.
    days.round().max(1.0) as u32
}

fn overdue_ms(state: &ReviewState, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(state.next_review_at())
        .num_milliseconds()
}

fn compare_priority(a: Option<&ReviewState>, b: Option<&ReviewState>, now: DateTime<Utc>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => overdue_ms(b, now)
            .cmp(&overdue_ms(a, now))
            .then_with(|| a.ease_factor().total_cmp(&b.ease_factor())),
    }
}

fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = due.signed_duration_since(now).num_milliseconds();
    (remaining as f64 / MS_PER_DAY as f64).ceil() as i64
}
