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

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde_json::Value;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;
use crate::store::KeyValueStore;
use crate::store::KvWrite;
use crate::types::word::WordId;

/// Consecutive correct answers needed to graduate a word.
pub const REQUIRED_STREAK: u32 = 3;

pub const IDS_KEY: &str = "remember.wordIds";
pub const PROGRESS_KEY: &str = "remember.progress";
/// Written by an older version that tracked missed words as a bare list.
pub const LEGACY_IDS_KEY: &str = "review.unlearnedIds";

/// The result of recording one reinforcement answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnswerOutcome {
    /// Correct, and the word stays in the list with this streak.
    Progressed { streak: u32 },
    /// Correct, and the streak reached `REQUIRED_STREAK`: the word left the
    /// list.
    Graduated,
    /// Incorrect; the streak went back to zero.
    Reset,
}

impl AnswerOutcome {
    pub fn is_correct(self) -> bool {
        self != AnswerOutcome::Reset
    }
}

/// The reinforcement list: word ids with their current streaks.
///
/// The id list and the progress map are persisted together on every
/// mutation. In-memory state only changes once the write succeeds.
pub struct ReinforcementList<K: KeyValueStore> {
    kv: K,
    entries: BTreeMap<WordId, u32>,
}

impl<K: KeyValueStore> ReinforcementList<K> {
    /// Load the list, merging in the legacy id list.
    ///
    /// Streaks without an id are dropped; ids without a streak start at
    /// zero. If the stored shape needed any repair, the repaired list is
    /// written back and the legacy key is removed.
    pub fn load(kv: K) -> Fallible<Self> {
        let ids = read_ids(&kv, IDS_KEY)?;
        let legacy = read_ids(&kv, LEGACY_IDS_KEY)?;
        let progress = read_progress(&kv)?;
        let legacy_present = kv.get(LEGACY_IDS_KEY)?.is_some();

        let mut entries = BTreeMap::new();
        for id in ids.iter().chain(legacy.iter()) {
            let streak = progress.get(id).copied().unwrap_or(0);
            entries.insert(id.clone(), streak.min(REQUIRED_STREAK - 1));
        }

        let repaired = legacy_present
            || entries.len() != ids.len()
            || progress.len() != entries.len()
            || entries.iter().any(|(id, streak)| progress.get(id) != Some(streak));
        let list = Self { kv, entries };
        if repaired {
            log::debug!(
                "Repaired reinforcement list: {} ids ({} legacy).",
                list.entries.len(),
                legacy.len()
            );
            list.kv.write_batch(&persisted_writes(&list.entries))?;
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &WordId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn streak(&self, id: &WordId) -> Option<u32> {
        self.entries.get(id).copied()
    }

    pub fn ids(&self) -> Vec<WordId> {
        self.entries.keys().cloned().collect()
    }

    /// Add a word with streak zero. Returns false, and leaves the streak
    /// alone, if the word is already listed.
    pub fn enqueue(&mut self, id: &WordId) -> Fallible<bool> {
        if self.entries.contains_key(id) {
            return Ok(false);
        }
        let mut next = self.entries.clone();
        next.insert(id.clone(), 0);
        self.commit(next)?;
        log::debug!("Enqueued {id} for reinforcement.");
        Ok(true)
    }

    /// Record one reinforcement answer for a listed word.
    pub fn record_answer(&mut self, id: &WordId, correct: bool) -> Fallible<AnswerOutcome> {
        let streak = match self.entries.get(id) {
            Some(streak) => *streak,
            None => {
                return fail_with(
                    ErrorKind::NotFound,
                    format!("word {id} is not in the reinforcement list"),
                );
            }
        };
        let mut next = self.entries.clone();
        let outcome = if !correct {
            next.insert(id.clone(), 0);
            AnswerOutcome::Reset
        } else if streak + 1 >= REQUIRED_STREAK {
            next.remove(id);
            AnswerOutcome::Graduated
        } else {
            next.insert(id.clone(), streak + 1);
            AnswerOutcome::Progressed { streak: streak + 1 }
        };
        self.commit(next)?;
        log::debug!("Reinforcement answer for {id}: {outcome:?}");
        Ok(outcome)
    }

    /// Drop every entry whose id is not in `valid`. Returns how many were
    /// removed. Writes nothing when nothing changes.
    pub fn prune(&mut self, valid: &HashSet<WordId>) -> Fallible<usize> {
        let next: BTreeMap<WordId, u32> = self
            .entries
            .iter()
            .filter(|(id, _)| valid.contains(*id))
            .map(|(id, streak)| (id.clone(), *streak))
            .collect();
        let removed = self.entries.len() - next.len();
        if removed > 0 {
            self.commit(next)?;
            log::debug!("Pruned {removed} orphaned reinforcement ids.");
        }
        Ok(removed)
    }

    fn commit(&mut self, next: BTreeMap<WordId, u32>) -> Fallible<()> {
        self.kv.write_batch(&persisted_writes(&next))?;
        self.entries = next;
        Ok(())
    }
}

/// The batch that persists `entries`: both keys together, and the legacy key
/// gone.
fn persisted_writes(entries: &BTreeMap<WordId, u32>) -> Vec<KvWrite> {
    let ids: Vec<&str> = entries.keys().map(|id| id.as_str()).collect();
    let progress: serde_json::Map<String, Value> = entries
        .iter()
        .map(|(id, streak)| (id.as_str().to_string(), Value::from(*streak)))
        .collect();
    vec![
        KvWrite::put(IDS_KEY, Value::from(ids).to_string()),
        KvWrite::put(PROGRESS_KEY, Value::Object(progress).to_string()),
        KvWrite::delete(LEGACY_IDS_KEY),
    ]
}

/// Read a JSON array of string ids, de-duplicated in order. Anything
/// malformed reads as empty; non-string elements are skipped.
fn read_ids<K: KeyValueStore>(kv: &K, key: &str) -> Fallible<Vec<WordId>> {
    let Some(raw) = kv.get(key)? else {
        return Ok(Vec::new());
    };
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&raw) else {
        log::warn!("Ignoring malformed value under {key}.");
        return Ok(Vec::new());
    };
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for item in items {
        if let Value::String(id) = item {
            if seen.insert(id.clone()) {
                ids.push(WordId::new(id));
            }
        }
    }
    Ok(ids)
}

/// Read the id-to-streak map. Malformed input reads as empty; negative or
/// non-integer streaks are skipped.
fn read_progress<K: KeyValueStore>(kv: &K) -> Fallible<BTreeMap<WordId, u32>> {
    let Some(raw) = kv.get(PROGRESS_KEY)? else {
        return Ok(BTreeMap::new());
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&raw) else {
        log::warn!("Ignoring malformed value under {PROGRESS_KEY}.");
        return Ok(BTreeMap::new());
    };
    let mut progress = BTreeMap::new();
    for (id, value) in map {
        if let Some(streak) = value.as_u64() {
            progress.insert(WordId::new(id), u32::try_from(streak).unwrap_or(u32::MAX));
        }
    }
    Ok(progress)
}
