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

use std::io::Write;
use std::io::stdout;

use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;

pub fn list_words(directory: Option<String>, query: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let mut output = stdout();
    let count = print_words(&collection.db, query.as_deref(), &mut output)?;
    log::debug!("Listed {count} words.");
    Ok(())
}

/// Print one line per word. Returns how many were printed.
pub fn print_words(db: &Database, query: Option<&str>, output: &mut impl Write) -> Fallible<usize> {
    let words = db.list_words(query)?;
    if words.is_empty() {
        writeln!(output, "No words found.")?;
        return Ok(0);
    }
    for entry in &words {
        let level = match entry.word.level {
            Some(level) => format!("L{level}"),
            None => "-".to_string(),
        };
        writeln!(
            output,
            "{}\t{}\t{level}\tdue {}",
            entry.word.term, entry.word.meaning, entry.state.due_at
        )?;
    }
    Ok(words.len())
}
