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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::error::fail_with;
use crate::srs;
use crate::store::KeyValueStore;
use crate::store::KvWrite;
use crate::store::WordStore;
use crate::types::direction::Direction;
use crate::types::grade::Grade;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;
use crate::types::word::ScheduledWord;
use crate::types::word::Word;
use crate::types::word::WordId;

const SCHEDULED_COLUMNS: &str = "w.id, w.term, w.meaning, w.level, w.created_at, s.ease, s.interval_days, s.repetitions, s.lapses, s.due_at, s.last_reviewed_at";

/// The SQLite-backed word store. Cloning gives another handle to the same
/// connection, so the word store and the key-value port can share one file.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating schema in {database_path}");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Add a new word, due immediately.
    ///
    /// Input is trimmed. If a word with the same term (ignoring case) exists,
    /// returns an error.
    pub fn add_word(
        &self,
        term: &str,
        meaning: &str,
        level: Option<u8>,
        now: Timestamp,
    ) -> Fallible<WordId> {
        let term = term.trim();
        let meaning = meaning.trim();
        if term.is_empty() || meaning.is_empty() {
            return fail("term and meaning must not be empty.");
        }
        if let Some(level) = level {
            if !(1..=5).contains(&level) {
                return fail(format!("level must be between 1 and 5, got {level}."));
            }
        }
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let existing: Option<WordId> = tx
            .query_row(
                "select id from word_entries where lower(term) = lower(?) limit 1;",
                [term],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return fail(format!("word already exists: {term}"));
        }
        let id = WordId::generate();
        tx.execute(
            "insert into word_entries (id, term, meaning, level, created_at, updated_at) values (?, ?, ?, ?, ?, ?);",
            (&id, term, meaning, level, now, now),
        )?;
        let state = SchedulingState::new(now);
        tx.execute(
            "insert into srs_state (word_entry_id, ease, interval_days, repetitions, lapses, due_at, last_reviewed_at) values (?, ?, ?, ?, ?, ?, ?);",
            (
                &id,
                state.ease,
                state.interval_days,
                state.repetitions,
                state.lapses,
                state.due_at,
                state.last_reviewed_at,
            ),
        )?;
        tx.commit()?;
        log::debug!("Added word {id}: {term}");
        Ok(id)
    }

    /// Delete a word along with its scheduling state and review log. Returns
    /// whether a word was deleted.
    pub fn delete_word(&self, id: &WordId) -> Fallible<bool> {
        let conn = self.acquire()?;
        let count = conn.execute("delete from word_entries where id = ?;", [id])?;
        Ok(count > 0)
    }

    /// Find a word by its term, ignoring case.
    pub fn find_by_term(&self, term: &str) -> Fallible<Option<Word>> {
        let conn = self.acquire()?;
        let word = conn
            .query_row(
                "select id, term, meaning, level, created_at from word_entries where lower(term) = lower(?) limit 1;",
                [term.trim()],
                read_word,
            )
            .optional()?;
        Ok(word)
    }

    /// Every word, most recently changed first. With a query, only words
    /// whose term or meaning contains it.
    pub fn list_words(&self, query: Option<&str>) -> Fallible<Vec<ScheduledWord>> {
        let query = query.map(str::trim).unwrap_or("");
        if query.is_empty() {
            let sql = format!(
                "select {SCHEDULED_COLUMNS} from srs_state s join word_entries w on w.id = s.word_entry_id order by w.updated_at desc;"
            );
            return self.query_scheduled(&sql, Vec::new());
        }
        let sql = format!(
            "select {SCHEDULED_COLUMNS} from srs_state s join word_entries w on w.id = s.word_entry_id where w.term like ? or w.meaning like ? order by w.updated_at desc;"
        );
        let pattern = format!("%{query}%");
        self.query_scheduled(&sql, vec![pattern.clone().into(), pattern.into()])
    }

    fn query_scheduled(&self, sql: &str, params: Vec<Value>) -> Fallible<Vec<ScheduledWord>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), read_scheduled)?;
        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ErrorReport::with_kind(ErrorKind::StorageFailure, "database connection poisoned")
        })
    }
}

impl WordStore for Database {
    fn find_due(&self, now: Timestamp, limit: usize) -> Fallible<Vec<ScheduledWord>> {
        let sql = format!(
            "select {SCHEDULED_COLUMNS} from srs_state s join word_entries w on w.id = s.word_entry_id where s.due_at <= ? order by s.due_at asc limit ?;"
        );
        self.query_scheduled(&sql, vec![now.as_millis().into(), sql_limit(limit).into()])
    }

    fn find_by_level_range(
        &self,
        min: u8,
        max: u8,
        limit: usize,
    ) -> Fallible<Vec<ScheduledWord>> {
        let sql = format!(
            "select {SCHEDULED_COLUMNS} from srs_state s join word_entries w on w.id = s.word_entry_id where w.level between ? and ? order by s.due_at asc limit ?;"
        );
        self.query_scheduled(
            &sql,
            vec![i64::from(min).into(), i64::from(max).into(), sql_limit(limit).into()],
        )
    }

    fn find_by_ids(&self, ids: &[WordId]) -> Fallible<Vec<ScheduledWord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "select {SCHEDULED_COLUMNS} from srs_state s join word_entries w on w.id = s.word_entry_id where w.id in ({placeholders}) order by s.due_at asc;"
        );
        let params = ids
            .iter()
            .map(|id| id.as_str().to_string().into())
            .collect();
        self.query_scheduled(&sql, params)
    }

    fn sample_random(&self, count: usize, exclude: &WordId) -> Fallible<Vec<Word>> {
        let conn = self.acquire()?;
        let mut stmt = conn.prepare(
            "select id, term, meaning, level, created_at from word_entries where id != ? order by random() limit ?;",
        )?;
        let rows = stmt.query_map((exclude, sql_limit(count)), read_word)?;
        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    fn apply_grade(
        &self,
        word_id: &WordId,
        grade: Grade,
        direction: Direction,
        now: Timestamp,
    ) -> Fallible<SchedulingState> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let current: Option<SchedulingState> = tx
            .query_row(
                "select ease, interval_days, repetitions, lapses, due_at, last_reviewed_at from srs_state where word_entry_id = ?;",
                [word_id],
                |row| read_state(row, 0),
            )
            .optional()?;
        let current = match current {
            Some(state) => state,
            None => {
                return fail_with(
                    ErrorKind::NotFound,
                    format!("no scheduling state for word {word_id}"),
                );
            }
        };
        let next = srs::update(&current, grade, now);
        tx.execute(
            "update srs_state set ease = ?, interval_days = ?, repetitions = ?, lapses = ?, due_at = ?, last_reviewed_at = ? where word_entry_id = ?;",
            (
                next.ease,
                next.interval_days,
                next.repetitions,
                next.lapses,
                next.due_at,
                next.last_reviewed_at,
                word_id,
            ),
        )?;
        tx.execute(
            "insert into review_log (word_entry_id, grade, direction, reviewed_at) values (?, ?, ?, ?);",
            (word_id, grade, direction, now),
        )?;
        tx.commit()?;
        Ok(next)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        let conn = self.acquire()?;
        let value = conn
            .query_row("select value from kv where key = ?;", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write_batch(&self, writes: &[KvWrite]) -> Fallible<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        for write in writes {
            match write {
                KvWrite::Put { key, value } => {
                    tx.execute(
                        "insert into kv (key, value) values (?, ?) on conflict (key) do update set value = excluded.value;",
                        (key, value),
                    )?;
                }
                KvWrite::Delete { key } => {
                    tx.execute("delete from kv where key = ?;", [key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn read_word(row: &Row) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        term: row.get(1)?,
        meaning: row.get(2)?,
        level: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn read_state(row: &Row, offset: usize) -> rusqlite::Result<SchedulingState> {
    Ok(SchedulingState {
        ease: row.get(offset)?,
        interval_days: row.get(offset + 1)?,
        repetitions: row.get(offset + 2)?,
        lapses: row.get(offset + 3)?,
        due_at: row.get(offset + 4)?,
        last_reviewed_at: row.get(offset + 5)?,
    })
}

fn read_scheduled(row: &Row) -> rusqlite::Result<ScheduledWord> {
    Ok(ScheduledWord {
        word: read_word(row)?,
        state: read_state(row, 5)?,
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["word_entries"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
impl Database {
    /// The number of entries in the review log.
    pub fn review_count(&self) -> Fallible<usize> {
        let conn = self.acquire()?;
        let count: i64 = conn.query_row("select count(*) from review_log;", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_database;

    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn test_add_word_creates_due_state() -> Fallible<()> {
        // Test data.
        let db = create_tmp_database()?;
        let id = db.add_word("  apple ", " elma ", Some(1), at(1_000))?;

        // Assertions.
        let found = db.find_by_ids(&[id.clone()])?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word.term, "apple");
        assert_eq!(found[0].word.meaning, "elma");
        assert_eq!(found[0].state, SchedulingState::new(at(1_000)));
        assert_eq!(db.find_due(at(1_000), 10)?.len(), 1);
        assert!(db.find_due(at(999), 10)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_add_word_rejects_duplicates_ignoring_case() -> Fallible<()> {
        let db = create_tmp_database()?;
        db.add_word("Apple", "elma", None, at(0))?;
        let result = db.add_word("apple", "elma", None, at(0));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_list_words_newest_first() -> Fallible<()> {
        // Test data.
        let db = create_tmp_database()?;
        db.add_word("apple", "elma", None, at(100))?;
        db.add_word("pear", "armut", Some(2), at(300))?;
        db.add_word("pineapple", "ananas", None, at(200))?;

        // Assertions.
        let terms = |words: Vec<ScheduledWord>| -> Vec<String> {
            words.into_iter().map(|w| w.word.term).collect()
        };
        assert_eq!(terms(db.list_words(None)?), vec!["pear", "pineapple", "apple"]);
        assert_eq!(terms(db.list_words(Some("  "))?).len(), 3);
        assert_eq!(terms(db.list_words(Some("APPLE"))?), vec!["pineapple", "apple"]);
        assert_eq!(terms(db.list_words(Some("arm"))?), vec!["pear"]);
        assert!(db.list_words(Some("kiwi"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_add_word_rejects_bad_level() -> Fallible<()> {
        let db = create_tmp_database()?;
        assert!(db.add_word("apple", "elma", Some(6), at(0)).is_err());
        assert!(db.add_word("apple", "elma", Some(0), at(0)).is_err());
        Ok(())
    }

    #[test]
    fn test_find_due_orders_and_limits() -> Fallible<()> {
        // Test data.
        let db = create_tmp_database()?;
        let a = db.add_word("a", "1", None, at(300))?;
        let b = db.add_word("b", "2", None, at(100))?;
        let c = db.add_word("c", "3", None, at(200))?;
        db.add_word("d", "4", None, at(900))?;

        // Assertions.
        let due: Vec<WordId> = db
            .find_due(at(500), 10)?
            .into_iter()
            .map(|w| w.word.id)
            .collect();
        assert_eq!(due, vec![b.clone(), c, a]);
        let capped = db.find_due(at(500), 1)?;
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].word.id, b);
        Ok(())
    }

    #[test]
    fn test_find_by_level_range_ignores_due() -> Fallible<()> {
        let db = create_tmp_database()?;
        let easy = db.add_word("easy", "kolay", Some(2), at(5_000))?;
        db.add_word("mid", "orta", Some(3), at(0))?;
        db.add_word("none", "yok", None, at(0))?;
        let found = db.find_by_level_range(1, 2, 10)?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word.id, easy);
        Ok(())
    }

    #[test]
    fn test_find_by_ids_skips_missing() -> Fallible<()> {
        let db = create_tmp_database()?;
        let a = db.add_word("a", "1", None, at(0))?;
        let found = db.find_by_ids(&[a.clone(), WordId::new("missing")])?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word.id, a);
        assert!(db.find_by_ids(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_sample_random_excludes_target() -> Fallible<()> {
        let db = create_tmp_database()?;
        let a = db.add_word("a", "1", None, at(0))?;
        db.add_word("b", "2", None, at(0))?;
        db.add_word("c", "3", None, at(0))?;
        for _ in 0..10 {
            let sample = db.sample_random(3, &a)?;
            assert_eq!(sample.len(), 2);
            assert!(sample.iter().all(|w| w.id != a));
        }
        Ok(())
    }

    #[test]
    fn test_apply_grade_updates_state_and_logs() -> Fallible<()> {
        // Test data.
        let db = create_tmp_database()?;
        let id = db.add_word("apple", "elma", None, at(0))?;
        let now = at(10_000);

        // Grade.
        let state = db.apply_grade(&id, Grade::Fail, Direction::EnToTr, now)?;

        // Assertions.
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.lapses, 1);
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.due_at, now.plus_days(1));
        let stored = db.find_by_ids(&[id])?;
        assert_eq!(stored[0].state, state);
        assert_eq!(db.review_count()?, 1);
        Ok(())
    }

    #[test]
    fn test_apply_grade_unknown_word() -> Fallible<()> {
        let db = create_tmp_database()?;
        let err = db
            .apply_grade(&WordId::new("nope"), Grade::Easy, Direction::EnToTr, at(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(db.review_count()?, 0);
        Ok(())
    }

    #[test]
    fn test_delete_word_cascades() -> Fallible<()> {
        let db = create_tmp_database()?;
        let id = db.add_word("apple", "elma", None, at(0))?;
        db.apply_grade(&id, Grade::Hard, Direction::TrToEn, at(0))?;
        assert!(db.delete_word(&id)?);
        assert!(db.find_by_ids(&[id.clone()])?.is_empty());
        assert_eq!(db.review_count()?, 0);
        assert!(!db.delete_word(&id)?);
        Ok(())
    }

    #[test]
    fn test_find_by_term() -> Fallible<()> {
        let db = create_tmp_database()?;
        let id = db.add_word("Apple", "elma", None, at(0))?;
        assert_eq!(db.find_by_term("apple")?.map(|w| w.id), Some(id));
        assert!(db.find_by_term("pear")?.is_none());
        Ok(())
    }

    #[test]
    fn test_kv_batch() -> Fallible<()> {
        let db = create_tmp_database()?;
        db.write_batch(&[KvWrite::put("a", "1".into()), KvWrite::put("b", "2".into())])?;
        assert_eq!(db.get("a")?, Some("1".to_string()));
        db.write_batch(&[KvWrite::put("a", "3".into()), KvWrite::delete("b")])?;
        assert_eq!(db.get("a")?, Some("3".to_string()));
        assert_eq!(db.get("b")?, None);
        Ok(())
    }

    /// Opening an existing database does not recreate the schema.
    #[test]
    fn test_reopen() -> Fallible<()> {
        let dir = crate::helper::create_tmp_directory()?;
        let path = dir.join("vocab.db");
        let path = path.to_str().ok_or_else(|| ErrorReport::new("invalid path"))?;
        let id = Database::new(path)?.add_word("apple", "elma", None, at(0))?;
        let db = Database::new(path)?;
        assert_eq!(db.find_by_ids(&[id])?.len(), 1);
        Ok(())
    }
}
