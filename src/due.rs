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

use clap::ValueEnum;

use crate::error::Fallible;
use crate::error::fail;
use crate::store::WordStore;
use crate::types::timestamp::Timestamp;
use crate::types::word::ScheduledWord;

/// A named band of difficulty levels for on-demand practice.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelBand {
    /// Levels 1-2.
    Easy,
    /// Levels 3-4.
    Medium,
    /// Level 5.
    Hard,
}

impl LevelBand {
    pub fn range(self) -> (u8, u8) {
        match self {
            LevelBand::Easy => (1, 2),
            LevelBand::Medium => (3, 4),
            LevelBand::Hard => (5, 5),
        }
    }
}

/// Words due at `now`, earliest first, at most `limit`.
pub fn due_now<W: WordStore>(
    store: &W,
    now: Timestamp,
    limit: usize,
) -> Fallible<Vec<ScheduledWord>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut words = store.find_due(now, limit)?;
    words.retain(|w| w.state.is_due(now));
    normalize(&mut words, limit);
    Ok(words)
}

/// Words in a level range regardless of due date, earliest due first, at
/// most `limit`.
pub fn by_level_range<W: WordStore>(
    store: &W,
    min: u8,
    max: u8,
    limit: usize,
) -> Fallible<Vec<ScheduledWord>> {
    if min > max {
        return fail(format!("invalid level range: {min}-{max}"));
    }
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut words = store.find_by_level_range(min, max, limit)?;
    words.retain(|w| w.word.level.is_some_and(|l| l >= min && l <= max));
    normalize(&mut words, limit);
    Ok(words)
}

pub fn by_band<W: WordStore>(
    store: &W,
    band: LevelBand,
    limit: usize,
) -> Fallible<Vec<ScheduledWord>> {
    let (min, max) = band.range();
    by_level_range(store, min, max, limit)
}

// Stores are expected to sort and cap already; this keeps the contract even
// when one doesn't.
fn normalize(words: &mut Vec<ScheduledWord>, limit: usize) {
    words.sort_by_key(|w| w.state.due_at);
    words.truncate(limit);
}
