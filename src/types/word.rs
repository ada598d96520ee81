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

use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;

/// Opaque identifier of a word record.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct WordId(String);

impl WordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for WordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for WordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for WordId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Ok(WordId(string))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Word {
    pub id: WordId,
    /// The word being learned.
    pub term: String,
    /// The word's meaning in the learner's language.
    pub meaning: String,
    /// Static difficulty level, 1 (easiest) to 5.
    pub level: Option<u8>,
    pub created_at: Timestamp,
}

/// A word together with its scheduling state.
#[derive(Clone, PartialEq, Debug)]
pub struct ScheduledWord {
    pub word: Word,
    pub state: SchedulingState,
}

impl ScheduledWord {
    pub fn id(&self) -> &WordId {
        &self.word.id
    }
}
