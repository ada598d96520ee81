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

use crate::collection::Collection;
use crate::config::Config;
use crate::due::LevelBand;
use crate::error::Fallible;
use crate::reinforce::list::ReinforcementList;
use crate::review::ReviewQueue;
use crate::store::KeyValueStore;
use crate::store::WordStore;
use crate::types::direction::Direction;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;

pub fn review_words(directory: Option<String>, band: Option<LevelBand>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let mut input = stdin().lock();
    let mut output = stdout();
    let reviewed = run_review(
        &collection.db,
        collection.db.clone(),
        &collection.config,
        band,
        &mut input,
        &mut output,
    )?;
    log::debug!("Reviewed {reviewed} words.");
    Ok(())
}

/// The terminal review loop. Returns the number of words graded.
pub fn run_review<W: WordStore, K: KeyValueStore>(
    store: &W,
    kv: K,
    config: &Config,
    band: Option<LevelBand>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<usize> {
    let mut list = ReinforcementList::load(kv)?;
    let mut queue = match band {
        Some(band) => ReviewQueue::band(store, band, config.level_limit, config.direction)?,
        None => ReviewQueue::due(store, Timestamp::now(), config.due_limit, config.direction)?,
    };
    if queue.is_empty() {
        writeln!(output, "No words to review.")?;
        return Ok(0);
    }
    let loaded = queue.remaining();
    while let Some(current) = queue.current() {
        let word = &current.word;
        let (shown, hidden) = match queue.direction() {
            Direction::EnToTr => (&word.term, &word.meaning),
            Direction::TrToEn => (&word.meaning, &word.term),
        };
        writeln!(output, "[{} left] Q: {shown}", queue.remaining())?;
        writeln!(output, "[press enter to reveal]")?;
        output.flush()?;
        if read_line(input)?.is_none() {
            break;
        }
        writeln!(output, "A: {hidden}")?;
        let Some(grade) = read_grade(input, output)? else {
            break;
        };
        match queue.grade(store, &mut list, grade, Timestamp::now()) {
            Ok(Some(graded)) => {
                writeln!(output, "Next review: {}", graded.state.due_at)?;
                if graded.enqueued {
                    writeln!(output, "Added to reinforcement.")?;
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("{}", e.message());
                writeln!(output, "{e}")?;
            }
        }
    }
    // A word leaves the queue once its grade is stored.
    let reviewed = loaded - queue.remaining();
    writeln!(output, "Reviewed {reviewed} words.")?;
    Ok(reviewed)
}

/// Prompt until a valid grade is entered. `None` on end of input or `q`.
fn read_grade(input: &mut impl BufRead, output: &mut impl Write) -> Fallible<Option<Grade>> {
    loop {
        writeln!(output, "Grade: (0 = Fail, 3 = Hard, 5 = Easy, q = quit)")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line == "q" {
            return Ok(None);
        }
        match line.parse::<u8>() {
            Ok(value) => match Grade::try_from(value) {
                Ok(grade) => return Ok(Some(grade)),
                Err(e) => writeln!(output, "{e}")?,
            },
            Err(_) => writeln!(output, "Invalid input. Please enter 0, 3, or 5.")?,
        }
    }
}

/// One trimmed line, or `None` at end of input.
pub(crate) fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::helper::create_tmp_database;
    use crate::reinforce::list::IDS_KEY;
    use crate::store::memory::MemoryKeyValueStore;
    use crate::store::memory::MemoryWordStore;
    use crate::types::word::WordId;

    fn run(
        store: &MemoryWordStore,
        kv: &MemoryKeyValueStore,
        band: Option<LevelBand>,
        script: &str,
    ) -> Fallible<(usize, String)> {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        let reviewed = run_review(
            store,
            kv.clone(),
            &Config::default(),
            band,
            &mut input,
            &mut output,
        )?;
        Ok((reviewed, String::from_utf8_lossy(&output).into_owned()))
    }

    #[test]
    fn test_nothing_due() -> Fallible<()> {
        let store = MemoryWordStore::new();
        let kv = MemoryKeyValueStore::new();
        let (reviewed, output) = run(&store, &kv, None, "")?;
        assert_eq!(reviewed, 0);
        assert!(output.contains("No words to review."));
        Ok(())
    }

    #[test]
    fn test_invalid_grade_reprompts() -> Fallible<()> {
        // Test data.
        let store = MemoryWordStore::new();
        let id = store.add("apple", "elma", None, Timestamp::from_millis(0));
        let kv = MemoryKeyValueStore::new();

        // Review.
        let (reviewed, output) = run(&store, &kv, None, "\n4\nabc\n0\n")?;

        // Assertions.
        assert_eq!(reviewed, 1);
        assert!(output.contains("Q: apple"));
        assert!(output.contains("A: elma"));
        assert!(output.contains("error: invalid grade: 4"));
        assert!(output.contains("Invalid input."));
        assert!(output.contains("Added to reinforcement."));
        assert_eq!(store.log().len(), 1);
        assert_eq!(store.state(&id).map(|s| s.lapses), Some(1));
        assert_eq!(kv.raw(IDS_KEY), Some(r#"["apple"]"#.to_string()));
        Ok(())
    }

    #[test]
    fn test_quit_midway() -> Fallible<()> {
        let store = MemoryWordStore::new();
        store.add("apple", "elma", Some(1), Timestamp::from_millis(0));
        store.add("pear", "armut", Some(2), Timestamp::from_millis(1));
        let kv = MemoryKeyValueStore::new();
        let (reviewed, _) = run(&store, &kv, Some(LevelBand::Easy), "\n5\n\nq\n")?;
        assert_eq!(reviewed, 1);
        assert_eq!(store.log().len(), 1);
        assert_eq!(kv.raw(IDS_KEY), None);
        Ok(())
    }

    /// A grade the store rejects is shown and the word is asked again.
    #[test]
    fn test_rejected_grade_is_retried() -> Fallible<()> {
        // Test data.
        let store = MemoryWordStore::new();
        let id = store.add("apple", "elma", None, Timestamp::from_millis(0));
        let kv = MemoryKeyValueStore::new();
        store.fail_next_grades(1);

        // Review.
        let (reviewed, output) = run(&store, &kv, None, "\n0\n\n0\n")?;

        // Assertions.
        assert_eq!(reviewed, 1);
        assert!(output.contains("error: word store busy"));
        assert_eq!(output.matches("Q: apple").count(), 2);
        assert!(output.contains("Added to reinforcement."));
        assert_eq!(store.log().len(), 1);
        assert_eq!(store.state(&id).map(|s| s.lapses), Some(1));
        Ok(())
    }

    /// A failed enqueue is shown and the review moves on to the next word.
    #[test]
    fn test_failed_enqueue_continues() -> Fallible<()> {
        // Test data.
        let store = MemoryWordStore::new();
        store.add("apple", "elma", None, Timestamp::from_millis(0));
        store.add("pear", "armut", None, Timestamp::from_millis(1));
        let kv = MemoryKeyValueStore::new();
        kv.fail_next_writes(1);

        // Review.
        let (reviewed, output) = run(&store, &kv, None, "\n0\n\n0\n")?;

        // Assertions.
        assert_eq!(reviewed, 2);
        assert!(output.contains("error: key-value store busy"));
        assert!(output.contains("Q: pear"));
        assert!(output.contains("Reviewed 2 words."));
        assert_eq!(store.log().len(), 2);
        assert_eq!(kv.raw(IDS_KEY), Some(r#"["pear"]"#.to_string()));
        Ok(())
    }

    /// The whole loop against a real database.
    #[test]
    fn test_review_with_database() -> Fallible<()> {
        // Test data.
        let db = create_tmp_database()?;
        let id: WordId = db.add_word("apple", "elma", Some(3), Timestamp::from_millis(0))?;
        let config = Config {
            direction: Direction::TrToEn,
            ..Config::default()
        };
        let mut input = Cursor::new(b"\n3\n".to_vec());
        let mut output = Vec::new();

        // Review.
        let reviewed = run_review(&db, db.clone(), &config, None, &mut input, &mut output)?;

        // Assertions.
        assert_eq!(reviewed, 1);
        let output = String::from_utf8_lossy(&output);
        assert!(output.contains("Q: elma"));
        assert!(output.contains("A: apple"));
        assert_eq!(db.review_count()?, 1);
        let list = ReinforcementList::load(db.clone())?;
        assert_eq!(list.ids(), vec![id]);
        Ok(())
    }
}
