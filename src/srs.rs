// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A simplified SM-2 scheduler.
//!
//! Unlike canonical SM-2, which steps through fixed 1 and 6 day intervals,
//! the first passing grade schedules the word 1 day (hard) or 2 days (easy)
//! out, and every later passing grade multiplies the interval by the ease.
//! Ease moves by fixed steps and is clamped to `[MIN_EASE, MAX_EASE]`.

use crate::types::grade::Grade;
use crate::types::scheduling::MAX_EASE;
use crate::types::scheduling::MIN_EASE;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;

const FAIL_EASE_PENALTY: f64 = 0.2;
const HARD_EASE_PENALTY: f64 = 0.05;
const EASY_EASE_BONUS: f64 = 0.05;

/// The first interval after a passing grade on a word with no repetitions.
const FIRST_HARD_INTERVAL: u32 = 1;
const FIRST_EASY_INTERVAL: u32 = 2;

/// Compute the scheduling state after grading a word at `now`.
pub fn update(state: &SchedulingState, grade: Grade, now: Timestamp) -> SchedulingState {
    let (ease, interval_days, repetitions, lapses) = match grade {
        Grade::Fail => (
            state.ease - FAIL_EASE_PENALTY,
            1,
            0,
            state.lapses.saturating_add(1),
        ),
        Grade::Hard => (
            state.ease - HARD_EASE_PENALTY,
            next_interval(state, FIRST_HARD_INTERVAL),
            state.repetitions.saturating_add(1),
            state.lapses,
        ),
        Grade::Easy => (
            state.ease + EASY_EASE_BONUS,
            next_interval(state, FIRST_EASY_INTERVAL),
            state.repetitions.saturating_add(1),
            state.lapses,
        ),
    };
    SchedulingState {
        ease: ease.clamp(MIN_EASE, MAX_EASE),
        interval_days,
        repetitions,
        lapses,
        due_at: now.plus_days(interval_days),
        last_reviewed_at: Some(now),
    }
}

/// Interval for a passing grade, using the ease from before this review.
fn next_interval(state: &SchedulingState, first: u32) -> u32 {
    if state.repetitions == 0 {
        first
    } else {
        // Float-to-int casts saturate, so huge products stay at u32::MAX.
        let grown = (f64::from(state.interval_days) * state.ease).round() as u32;
        grown.max(1)
    }
}
