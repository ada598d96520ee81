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

use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::store::WordStore;
use crate::types::word::Word;

/// The number of options a complete matching question shows.
pub const MATCHING_OPTIONS: usize = 4;

/// The three reinforcement question styles.
#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Type the meaning.
    Typing,
    /// Pick the meaning from a list.
    Matching,
    /// Judge whether a shown meaning is right.
    TrueFalse,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Typing => "typing",
            Mode::Matching => "matching",
            Mode::TrueFalse => "true-false",
        }
    }
}

/// What the learner submitted.
#[derive(Clone, PartialEq, Debug)]
pub enum Answer {
    Typed(String),
    /// Index into the matching options.
    Choice(usize),
    Truth(bool),
}

/// Something that can judge an answer.
pub trait Evaluate {
    type Answer: ?Sized;

    fn evaluate(&self, answer: &Self::Answer) -> bool;
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hint {
    pub first: char,
    pub length: usize,
}

impl Display for Hint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "first letter: {} | length: {}", self.first, self.length)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct TypedRecall {
    pub prompt: String,
    pub expected: String,
}

impl TypedRecall {
    pub fn hint(&self) -> Option<Hint> {
        let first = self.expected.chars().next()?;
        Some(Hint {
            first,
            length: self.expected.chars().count(),
        })
    }
}

impl Evaluate for TypedRecall {
    type Answer = str;

    fn evaluate(&self, answer: &str) -> bool {
        normalize(answer) == normalize(&self.expected)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct MatchOption {
    pub label: String,
    pub is_correct: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Matching {
    pub prompt: String,
    pub options: Vec<MatchOption>,
}

impl Evaluate for Matching {
    type Answer = usize;

    fn evaluate(&self, choice: &usize) -> bool {
        self.options.get(*choice).is_some_and(|o| o.is_correct)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Statement {
    pub meaning: String,
    pub is_correct: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TrueFalse {
    pub prompt: String,
    pub statement: Statement,
}

impl Evaluate for TrueFalse {
    type Answer = bool;

    fn evaluate(&self, choice: &bool) -> bool {
        *choice == self.statement.is_correct
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Question {
    Typed(TypedRecall),
    Matching(Matching),
    TrueFalse(TrueFalse),
}

impl Question {
    pub fn mode(&self) -> Mode {
        match self {
            Question::Typed(_) => Mode::Typing,
            Question::Matching(_) => Mode::Matching,
            Question::TrueFalse(_) => Mode::TrueFalse,
        }
    }

    /// Judge an answer. Returns `None` when there is nothing to judge: a
    /// blank typed answer, an option index out of range, or an answer of the
    /// wrong kind for this question.
    pub fn evaluate(&self, answer: &Answer) -> Option<bool> {
        match (self, answer) {
            (Question::Typed(q), Answer::Typed(text)) if !text.trim().is_empty() => {
                Some(q.evaluate(text.as_str()))
            }
            (Question::Matching(q), Answer::Choice(index)) if *index < q.options.len() => {
                Some(q.evaluate(index))
            }
            (Question::TrueFalse(q), Answer::Truth(choice)) => Some(q.evaluate(choice)),
            _ => None,
        }
    }
}

/// A freshly built question, plus a warning when it had to make do with
/// fewer distractors than it wanted.
#[derive(Debug)]
pub struct Generated {
    pub question: Question,
    pub warning: Option<ErrorReport>,
}

/// Build a question of the given mode for `word`.
pub fn build_question<W: WordStore, R: Rng + ?Sized>(
    mode: Mode,
    word: &Word,
    store: &W,
    rng: &mut R,
) -> Fallible<Generated> {
    match mode {
        Mode::Typing => Ok(Generated {
            question: Question::Typed(TypedRecall {
                prompt: word.term.clone(),
                expected: word.meaning.clone(),
            }),
            warning: None,
        }),
        Mode::Matching => build_matching(word, store, rng),
        Mode::TrueFalse => build_true_false(word, store, rng),
    }
}

fn build_matching<W: WordStore, R: Rng + ?Sized>(
    word: &Word,
    store: &W,
    rng: &mut R,
) -> Fallible<Generated> {
    let distractors = store.sample_random(MATCHING_OPTIONS - 1, &word.id)?;
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(normalize(&word.meaning));
    let mut options = vec![MatchOption {
        label: word.meaning.clone(),
        is_correct: true,
    }];
    for other in distractors {
        if other.id == word.id {
            continue;
        }
        if seen.insert(normalize(&other.meaning)) {
            options.push(MatchOption {
                label: other.meaning,
                is_correct: false,
            });
        }
    }
    options.truncate(MATCHING_OPTIONS);
    options.shuffle(rng);
    let warning = if options.len() < MATCHING_OPTIONS {
        log::warn!(
            "Matching question for {} has only {} options.",
            word.id,
            options.len()
        );
        Some(ErrorReport::with_kind(
            ErrorKind::DegradedQuestionData,
            format!(
                "matching needs at least {MATCHING_OPTIONS} words; showing {} options.",
                options.len()
            ),
        ))
    } else {
        None
    };
    Ok(Generated {
        question: Question::Matching(Matching {
            prompt: word.term.clone(),
            options,
        }),
        warning,
    })
}

fn build_true_false<W: WordStore, R: Rng + ?Sized>(
    word: &Word,
    store: &W,
    rng: &mut R,
) -> Fallible<Generated> {
    let truthful = Statement {
        meaning: word.meaning.clone(),
        is_correct: true,
    };
    let statement = if rng.gen_bool(0.5) {
        truthful
    } else {
        let distractor = store
            .sample_random(1, &word.id)?
            .into_iter()
            .find(|other| other.id != word.id);
        match distractor {
            Some(other) => Statement {
                // Two words can share a meaning; then the statement is true.
                is_correct: normalize(&other.meaning) == normalize(&word.meaning),
                meaning: other.meaning,
            },
            // No other word exists, so the statement can only be true.
            None => truthful,
        }
    };
    Ok(Generated {
        question: Question::TrueFalse(TrueFalse {
            prompt: word.term.clone(),
            statement,
        }),
        warning: None,
    })
}
