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

use crate::types::timestamp::Timestamp;

pub const INITIAL_EASE: f64 = 2.5;
pub const MIN_EASE: f64 = 1.3;
pub const MAX_EASE: f64 = 3.0;

/// Spaced-repetition state for one word.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SchedulingState {
    /// Interval growth multiplier, always within `[MIN_EASE, MAX_EASE]`.
    pub ease: f64,
    /// Days until the next review. Zero only before the first review.
    pub interval_days: u32,
    /// Consecutive passing grades since the last lapse.
    pub repetitions: u32,
    /// Total failing grades.
    pub lapses: u32,
    pub due_at: Timestamp,
    pub last_reviewed_at: Option<Timestamp>,
}

impl SchedulingState {
    /// The state of a freshly added word: due immediately.
    pub fn new(now: Timestamp) -> Self {
        Self {
            ease: INITIAL_EASE,
            interval_days: 0,
            repetitions: 0,
            lapses: 0,
            due_at: now,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.due_at <= now
    }
}
