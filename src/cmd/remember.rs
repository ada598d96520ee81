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

use std::io::BufRead;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use clap::ValueEnum;
use rand::Rng;
use rand::thread_rng;

use crate::cmd::review::read_line;
use crate::collection::Collection;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::reinforce::question::Answer;
use crate::reinforce::question::Mode;
use crate::reinforce::question::Question;
use crate::reinforce::session::ReinforcementSession;
use crate::reinforce::session::Stage;
use crate::reinforce::session::SubmitResult;
use crate::store::KeyValueStore;
use crate::store::WordStore;

pub fn remember_words(directory: Option<String>, mode: Mode) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let mut input = stdin().lock();
    let mut output = stdout();
    run_remember(
        &collection.db,
        collection.db.clone(),
        mode,
        thread_rng(),
        &mut input,
        &mut output,
    )
}

/// The terminal reinforcement loop.
pub fn run_remember<W: WordStore, K: KeyValueStore, R: Rng>(
    store: &W,
    kv: K,
    mode: Mode,
    rng: R,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let mut session = ReinforcementSession::open(store, kv, mode, rng)?;
    if session.is_finished() {
        writeln!(output, "Nothing to reinforce.")?;
        return Ok(());
    }
    writeln!(output, "Commands: :hint, :mode typing|matching|true-false, :quit")?;
    while !session.is_finished() {
        if session.stage() == Stage::Feedback {
            if let Err(e) = session.advance(store) {
                report(&e, output)?;
                writeln!(output, "[press enter to retry]")?;
                output.flush()?;
                if read_line(input)?.is_none() {
                    return Ok(());
                }
            }
            continue;
        }
        show_question(&session, output)?;
        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        if line == ":quit" {
            return Ok(());
        }
        if line == ":hint" {
            match session.toggle_hint() {
                Some(hint) => writeln!(output, "Hint: {hint}")?,
                None => writeln!(output, "No hint.")?,
            }
            continue;
        }
        if let Some(name) = line.strip_prefix(":mode") {
            match Mode::from_str(name.trim(), true) {
                Ok(mode) => {
                    if let Err(e) = session.switch_mode(mode, store) {
                        report(&e, output)?;
                    }
                }
                Err(_) => writeln!(output, "Unknown mode: {}", name.trim())?,
            }
            continue;
        }
        let Some(answer) = parse_answer(session.mode(), &line) else {
            writeln!(output, "Please enter an answer.")?;
            continue;
        };
        match session.submit(&answer) {
            Ok(SubmitResult::Ignored) => writeln!(output, "Please enter an answer.")?,
            Ok(SubmitResult::Answered(feedback)) => {
                writeln!(output, "{}", feedback.message)?;
                if !feedback.is_positive() {
                    writeln!(output, "Answer: {}", feedback.expected)?;
                }
            }
            Err(e) => report(&e, output)?,
        }
    }
    writeln!(output, "All words learned.")?;
    Ok(())
}

/// Show a storage error and keep the session going. The session is left as
/// it was before the failed step.
fn report(e: &ErrorReport, output: &mut impl Write) -> Fallible<()> {
    log::error!("{}", e.message());
    writeln!(output, "{e}")?;
    Ok(())
}

fn show_question<K: KeyValueStore, R: Rng>(
    session: &ReinforcementSession<K, R>,
    output: &mut impl Write,
) -> Fallible<()> {
    let Some(question) = session.question() else {
        return Ok(());
    };
    writeln!(output)?;
    writeln!(
        output,
        "[{} left, streak {}]",
        session.remaining(),
        session.current_streak()
    )?;
    if let Some(warning) = session.warning() {
        writeln!(output, "({})", warning.message())?;
    }
    match question {
        Question::Typed(q) => writeln!(output, "Meaning of \"{}\"?", q.prompt)?,
        Question::Matching(q) => {
            writeln!(output, "Meaning of \"{}\"?", q.prompt)?;
            for (index, option) in q.options.iter().enumerate() {
                writeln!(output, "  {}) {}", index + 1, option.label)?;
            }
        }
        Question::TrueFalse(q) => writeln!(
            output,
            "\"{}\" means \"{}\". True or false? (t/f)",
            q.prompt, q.statement.meaning
        )?,
    }
    output.flush()?;
    Ok(())
}

/// Read an answer in the form the mode expects. Matching options are
/// numbered from one.
fn parse_answer(mode: Mode, line: &str) -> Option<Answer> {
    match mode {
        Mode::Typing => Some(Answer::Typed(line.to_string())),
        Mode::Matching => match line.parse::<usize>() {
            Ok(n) if n >= 1 => Some(Answer::Choice(n - 1)),
            _ => None,
        },
        Mode::TrueFalse => match line.to_lowercase().as_str() {
            "t" | "true" | "y" | "yes" => Some(Answer::Truth(true)),
            "f" | "false" | "n" | "no" => Some(Answer::Truth(false)),
            _ => None,
        },
    }
}
