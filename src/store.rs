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

//! The ports the engine drives. The SQLite `Database` implements both; tests
//! substitute the in-memory implementations in `store::memory`.

#[cfg(test)]
pub mod memory;

use crate::error::Fallible;
use crate::types::direction::Direction;
use crate::types::grade::Grade;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;
use crate::types::word::ScheduledWord;
use crate::types::word::Word;
use crate::types::word::WordId;

/// Durable word and scheduling storage.
pub trait WordStore {
    /// Words with `due_at <= now`, ascending by `due_at`, at most `limit`.
    fn find_due(&self, now: Timestamp, limit: usize) -> Fallible<Vec<ScheduledWord>>;

    /// Words whose level is within `[min, max]`, ascending by `due_at`, at
    /// most `limit`.
    fn find_by_level_range(&self, min: u8, max: u8, limit: usize)
    -> Fallible<Vec<ScheduledWord>>;

    /// The subset of `ids` that still exist. Missing ids are silently
    /// skipped.
    fn find_by_ids(&self, ids: &[WordId]) -> Fallible<Vec<ScheduledWord>>;

    /// Up to `count` random words, never including `exclude`.
    fn sample_random(&self, count: usize, exclude: &WordId) -> Fallible<Vec<Word>>;

    /// Apply the SRS update for `grade` and append a review-log entry, as one
    /// atomic unit. Fails with `NotFound` if the word has no scheduling
    /// state.
    fn apply_grade(
        &self,
        word_id: &WordId,
        grade: Grade,
        direction: Direction,
        now: Timestamp,
    ) -> Fallible<SchedulingState>;
}

/// One mutation in an atomic key-value batch.
#[derive(Clone, PartialEq, Debug)]
pub enum KvWrite {
    Put { key: String, value: String },
    Delete { key: String },
}

impl KvWrite {
    pub fn put(key: &str, value: String) -> Self {
        KvWrite::Put {
            key: key.to_string(),
            value,
        }
    }

    pub fn delete(key: &str) -> Self {
        KvWrite::Delete {
            key: key.to_string(),
        }
    }
}

/// String key-value storage for engine-owned state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Fallible<Option<String>>;

    /// Apply every write or none of them.
    fn write_batch(&self, writes: &[KvWrite]) -> Fallible<()>;
}
