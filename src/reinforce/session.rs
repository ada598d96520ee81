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

use std::collections::HashMap;
use std::collections::HashSet;

use rand::Rng;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::reinforce::list::AnswerOutcome;
use crate::reinforce::list::REQUIRED_STREAK;
use crate::reinforce::list::ReinforcementList;
use crate::reinforce::pick::pick_random_id;
use crate::reinforce::question::Answer;
use crate::reinforce::question::Generated;
use crate::reinforce::question::Hint;
use crate::reinforce::question::Mode;
use crate::reinforce::question::Question;
use crate::reinforce::question::build_question;
use crate::store::KeyValueStore;
use crate::store::WordStore;
use crate::types::word::Word;
use crate::types::word::WordId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    Answering,
    Feedback,
}

/// What the learner is told after submitting.
#[derive(Clone, PartialEq, Debug)]
pub struct Feedback {
    pub outcome: AnswerOutcome,
    pub message: String,
    /// The right answer, shown after a miss.
    pub expected: String,
}

impl Feedback {
    fn new(outcome: AnswerOutcome, expected: &str) -> Self {
        let message = match outcome {
            AnswerOutcome::Progressed { streak } => {
                format!("Correct! ({streak}/{REQUIRED_STREAK})")
            }
            AnswerOutcome::Graduated => {
                format!("{REQUIRED_STREAK} in a row: word learned.")
            }
            AnswerOutcome::Reset => {
                format!("Wrong. {REQUIRED_STREAK} correct answers in a row are needed again.")
            }
        };
        Self {
            outcome,
            message,
            expected: expected.to_string(),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.outcome.is_correct()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum SubmitResult {
    /// Nothing to judge, or not accepting answers right now.
    Ignored,
    Answered(Feedback),
}

/// A reinforcement practice session over the words in the reinforcement
/// list.
///
/// Every mode goes through the same `answering -> feedback -> answering`
/// cycle and reports answers through `ReinforcementList::record_answer`. A
/// storage failure leaves the session exactly as it was.
pub struct ReinforcementSession<K: KeyValueStore, R: Rng> {
    list: ReinforcementList<K>,
    words: HashMap<WordId, Word>,
    mode: Mode,
    cursor: Option<WordId>,
    stage: Stage,
    question: Option<Question>,
    warning: Option<ErrorReport>,
    hint_visible: bool,
    feedback: Option<Feedback>,
    pending_next: Option<WordId>,
    rng: R,
}

impl<K: KeyValueStore, R: Rng> ReinforcementSession<K, R> {
    /// Load the reinforcement list, reconcile it against the word store,
    /// and pick a random starting word.
    pub fn open<W: WordStore>(store: &W, kv: K, mode: Mode, mut rng: R) -> Fallible<Self> {
        let mut list = ReinforcementList::load(kv)?;
        let found = store.find_by_ids(&list.ids())?;
        let valid: HashSet<WordId> = found.iter().map(|w| w.id().clone()).collect();
        list.prune(&valid)?;
        let words: HashMap<WordId, Word> = found
            .into_iter()
            .map(|w| (w.word.id.clone(), w.word))
            .collect();
        let cursor = pick_random_id(&list.ids(), None, &mut rng);
        log::debug!(
            "Opened reinforcement session: {} words, mode {}.",
            list.len(),
            mode.as_str()
        );
        let mut session = Self {
            list,
            words,
            mode,
            cursor: None,
            stage: Stage::Answering,
            question: None,
            warning: None,
            hint_visible: false,
            feedback: None,
            pending_next: None,
            rng,
        };
        let generated = session.generate(cursor.as_ref(), mode, store)?;
        session.settle(cursor, generated);
        Ok(session)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.cursor.as_ref().and_then(|id| self.words.get(id))
    }

    /// The current word's streak.
    pub fn current_streak(&self) -> u32 {
        self.cursor
            .as_ref()
            .and_then(|id| self.list.streak(id))
            .unwrap_or(0)
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// A non-blocking warning about the current question.
    pub fn warning(&self) -> Option<&ErrorReport> {
        self.warning.as_ref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    /// The word that a correct answer will move on to.
    pub fn pending_next(&self) -> Option<&WordId> {
        self.pending_next.as_ref()
    }

    pub fn remaining(&self) -> usize {
        self.list.len()
    }

    /// True once the list is empty and there is nothing left to practice.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    /// Show or hide the hint for a typed question. Returns the hint if it is
    /// now visible.
    pub fn toggle_hint(&mut self) -> Option<Hint> {
        if self.stage != Stage::Answering {
            return None;
        }
        let Some(Question::Typed(question)) = &self.question else {
            return None;
        };
        let hint = question.hint();
        self.hint_visible = !self.hint_visible;
        if self.hint_visible { hint } else { None }
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    /// Submit an answer for the current question.
    pub fn submit(&mut self, answer: &Answer) -> Fallible<SubmitResult> {
        if self.stage != Stage::Answering {
            return Ok(SubmitResult::Ignored);
        }
        let (Some(id), Some(question)) = (self.cursor.clone(), self.question.as_ref()) else {
            return Ok(SubmitResult::Ignored);
        };
        let Some(correct) = question.evaluate(answer) else {
            return Ok(SubmitResult::Ignored);
        };
        let expected = self
            .words
            .get(&id)
            .map(|w| w.meaning.clone())
            .unwrap_or_default();
        let outcome = self.list.record_answer(&id, correct)?;
        let feedback = Feedback::new(outcome, &expected);
        self.pending_next = pick_random_id(&self.list.ids(), Some(&id), &mut self.rng);
        self.feedback = Some(feedback.clone());
        self.stage = Stage::Feedback;
        Ok(SubmitResult::Answered(feedback))
    }

    /// Leave the feedback stage. After a correct answer the session moves on
    /// to the pre-selected word; after a miss the same word is asked again.
    /// Returns false if there was no feedback to leave.
    pub fn advance<W: WordStore>(&mut self, store: &W) -> Fallible<bool> {
        if self.stage != Stage::Feedback {
            return Ok(false);
        }
        let was_correct = self.feedback.as_ref().is_some_and(|f| f.is_positive());
        let next = if was_correct {
            match &self.pending_next {
                Some(id) if self.list.contains(id) => Some(id.clone()),
                _ => pick_random_id(&self.list.ids(), self.cursor.as_ref(), &mut self.rng),
            }
        } else {
            self.cursor.clone()
        };
        let generated = self.generate(next.as_ref(), self.mode, store)?;
        self.settle(next, generated);
        Ok(true)
    }

    /// Switch to another question style. The question in flight is dropped
    /// and a new one is built for the current word.
    pub fn switch_mode<W: WordStore>(&mut self, mode: Mode, store: &W) -> Fallible<()> {
        if mode == self.mode {
            return Ok(());
        }
        // A word that graduated during feedback is no longer practiced.
        let cursor = match &self.cursor {
            Some(id) if self.list.contains(id) => Some(id.clone()),
            _ => match &self.pending_next {
                Some(id) if self.list.contains(id) => Some(id.clone()),
                _ => pick_random_id(&self.list.ids(), None, &mut self.rng),
            },
        };
        let generated = self.generate(cursor.as_ref(), mode, store)?;
        log::debug!("Switched reinforcement mode to {}.", mode.as_str());
        self.mode = mode;
        self.settle(cursor, generated);
        Ok(())
    }

    fn generate<W: WordStore>(
        &mut self,
        cursor: Option<&WordId>,
        mode: Mode,
        store: &W,
    ) -> Fallible<Option<Generated>> {
        let Some(word) = cursor.and_then(|id| self.words.get(id)) else {
            return Ok(None);
        };
        let generated = build_question(mode, word, store, &mut self.rng)?;
        Ok(Some(generated))
    }

    /// Point the session at `cursor` with a fresh question, back in the
    /// answering stage.
    fn settle(&mut self, cursor: Option<WordId>, generated: Option<Generated>) {
        let (question, warning) = match generated {
            Some(Generated { question, warning }) => (Some(question), warning),
            None => (None, None),
        };
        self.cursor = cursor;
        self.question = question;
        self.warning = warning;
        self.hint_visible = false;
        self.feedback = None;
        self.pending_next = None;
        self.stage = Stage::Answering;
    }
}
