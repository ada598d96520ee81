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

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::srs;
use crate::store::KeyValueStore;
use crate::store::KvWrite;
use crate::store::WordStore;
use crate::types::direction::Direction;
use crate::types::grade::Grade;
use crate::types::review::ReviewLogEntry;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;
use crate::types::word::ScheduledWord;
use crate::types::word::Word;
use crate::types::word::WordId;

/// A word store held in memory. Sampling is deterministic (insertion order)
/// so tests can predict distractors.
#[derive(Default)]
pub struct MemoryWordStore {
    words: RefCell<Vec<ScheduledWord>>,
    log: RefCell<Vec<ReviewLogEntry>>,
    failing: Cell<bool>,
    failing_grades: Cell<usize>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, term: &str, meaning: &str, level: Option<u8>, now: Timestamp) -> WordId {
        let id = WordId::new(term);
        let word = Word {
            id: id.clone(),
            term: term.to_string(),
            meaning: meaning.to_string(),
            level,
            created_at: now,
        };
        self.words.borrow_mut().push(ScheduledWord {
            word,
            state: SchedulingState::new(now),
        });
        id
    }

    pub fn set_state(&self, id: &WordId, state: SchedulingState) {
        for entry in self.words.borrow_mut().iter_mut() {
            if &entry.word.id == id {
                entry.state = state;
            }
        }
    }

    pub fn state(&self, id: &WordId) -> Option<SchedulingState> {
        self.words
            .borrow()
            .iter()
            .find(|entry| &entry.word.id == id)
            .map(|entry| entry.state)
    }

    pub fn remove(&self, id: &WordId) {
        self.words.borrow_mut().retain(|entry| &entry.word.id != id);
    }

    pub fn log(&self) -> Vec<ReviewLogEntry> {
        self.log.borrow().clone()
    }

    /// Make every subsequent call fail with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Make the next `count` grades fail with a storage error.
    pub fn fail_next_grades(&self, count: usize) {
        self.failing_grades.set(count);
    }

    fn check(&self) -> Fallible<()> {
        if self.failing.get() {
            return fail_with(ErrorKind::StorageFailure, "word store unavailable");
        }
        Ok(())
    }

    fn sorted(&self, filter: impl Fn(&ScheduledWord) -> bool, limit: usize) -> Vec<ScheduledWord> {
        let mut found: Vec<ScheduledWord> = self
            .words
            .borrow()
            .iter()
            .filter(|entry| filter(entry))
            .cloned()
            .collect();
        found.sort_by_key(|entry| entry.state.due_at);
        found.truncate(limit);
        found
    }
}

impl WordStore for MemoryWordStore {
    fn find_due(&self, now: Timestamp, limit: usize) -> Fallible<Vec<ScheduledWord>> {
        self.check()?;
        Ok(self.sorted(|entry| entry.state.due_at <= now, limit))
    }

    fn find_by_level_range(
        &self,
        min: u8,
        max: u8,
        limit: usize,
    ) -> Fallible<Vec<ScheduledWord>> {
        self.check()?;
        Ok(self.sorted(
            |entry| entry.word.level.is_some_and(|l| l >= min && l <= max),
            limit,
        ))
    }

    fn find_by_ids(&self, ids: &[WordId]) -> Fallible<Vec<ScheduledWord>> {
        self.check()?;
        Ok(self.sorted(|entry| ids.contains(&entry.word.id), usize::MAX))
    }

    fn sample_random(&self, count: usize, exclude: &WordId) -> Fallible<Vec<Word>> {
        self.check()?;
        Ok(self
            .words
            .borrow()
            .iter()
            .filter(|entry| &entry.word.id != exclude)
            .take(count)
            .map(|entry| entry.word.clone())
            .collect())
    }

    fn apply_grade(
        &self,
        word_id: &WordId,
        grade: Grade,
        direction: Direction,
        now: Timestamp,
    ) -> Fallible<SchedulingState> {
        self.check()?;
        let pending = self.failing_grades.get();
        if pending > 0 {
            self.failing_grades.set(pending - 1);
            return fail_with(ErrorKind::StorageFailure, "word store busy");
        }
        let current = match self.state(word_id) {
            Some(state) => state,
            None => {
                return fail_with(
                    ErrorKind::NotFound,
                    format!("no scheduling state for word {word_id}"),
                );
            }
        };
        let next = srs::update(&current, grade, now);
        self.set_state(word_id, next);
        self.log.borrow_mut().push(ReviewLogEntry {
            word_id: word_id.clone(),
            grade,
            direction,
            reviewed_at: now,
        });
        Ok(next)
    }
}

/// A key-value store held in memory. Clones share the same map, so a test
/// can keep a handle to inspect what the engine wrote.
#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    map: Rc<RefCell<BTreeMap<String, String>>>,
    failing: Rc<Cell<bool>>,
    failing_writes: Rc<Cell<usize>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Make the next `count` write batches fail with a storage error.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.set(count);
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        if self.failing.get() {
            return fail_with(ErrorKind::StorageFailure, "key-value store unavailable");
        }
        Ok(self.map.borrow().get(key).cloned())
    }

    fn write_batch(&self, writes: &[KvWrite]) -> Fallible<()> {
        if self.failing.get() {
            return fail_with(ErrorKind::StorageFailure, "key-value store unavailable");
        }
        let pending = self.failing_writes.get();
        if pending > 0 {
            self.failing_writes.set(pending - 1);
            return fail_with(ErrorKind::StorageFailure, "key-value store busy");
        }
        let mut map = self.map.borrow_mut();
        for write in writes {
            match write {
                KvWrite::Put { key, value } => {
                    map.insert(key.clone(), value.clone());
                }
                KvWrite::Delete { key } => {
                    map.remove(key);
                }
            }
        }
        Ok(())
    }
}
