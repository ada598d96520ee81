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

use std::collections::VecDeque;

use crate::due::LevelBand;
use crate::due::by_band;
use crate::due::due_now;
use crate::error::Fallible;
use crate::reinforce::list::ReinforcementList;
use crate::store::KeyValueStore;
use crate::store::WordStore;
use crate::types::direction::Direction;
use crate::types::grade::Grade;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;
use crate::types::word::ScheduledWord;
use crate::types::word::WordId;

/// What grading one word did.
#[derive(Clone, PartialEq, Debug)]
pub struct Graded {
    pub word_id: WordId,
    pub state: SchedulingState,
    /// Whether the word was newly added to the reinforcement list.
    pub enqueued: bool,
}

/// The words left in a review, front first.
pub struct ReviewQueue {
    words: VecDeque<ScheduledWord>,
    direction: Direction,
}

impl ReviewQueue {
    /// Words due at `now`.
    pub fn due<W: WordStore>(
        store: &W,
        now: Timestamp,
        limit: usize,
        direction: Direction,
    ) -> Fallible<Self> {
        let words = due_now(store, now, limit)?;
        Ok(Self::from_words(words, direction))
    }

    /// Words in a level band, due or not.
    pub fn band<W: WordStore>(
        store: &W,
        band: LevelBand,
        limit: usize,
        direction: Direction,
    ) -> Fallible<Self> {
        let words = by_band(store, band, limit)?;
        Ok(Self::from_words(words, direction))
    }

    fn from_words(words: Vec<ScheduledWord>, direction: Direction) -> Self {
        log::debug!("Loaded {} words for review.", words.len());
        Self {
            words: words.into(),
            direction,
        }
    }

    pub fn current(&self) -> Option<&ScheduledWord> {
        self.words.front()
    }

    pub fn remaining(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Grade the current word and move past it. Returns `None` if the queue
    /// is empty.
    ///
    /// The word leaves the queue once its grade is stored. If the store
    /// rejects the grade, nothing changes. A failure to enqueue it for
    /// reinforcement is reported after the word has left the queue.
    pub fn grade<W: WordStore, K: KeyValueStore>(
        &mut self,
        store: &W,
        list: &mut ReinforcementList<K>,
        grade: Grade,
        now: Timestamp,
    ) -> Fallible<Option<Graded>> {
        let Some(front) = self.words.front() else {
            return Ok(None);
        };
        let word_id = front.id().clone();
        let state = store.apply_grade(&word_id, grade, self.direction, now)?;
        self.words.pop_front();
        log::debug!(
            "Graded {word_id} as {}: next due {}.",
            grade.as_str(),
            state.due_at
        );
        let enqueued = grade.needs_reinforcement() && list.enqueue(&word_id)?;
        Ok(Some(Graded {
            word_id,
            state,
            enqueued,
        }))
    }
}
