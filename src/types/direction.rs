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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::fail;

/// Which side of the word the learner was shown during a review.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
pub enum Direction {
    /// The term is shown, the meaning is recalled.
    #[default]
    #[serde(rename = "EN->TR")]
    EnToTr,
    /// The meaning is shown, the term is recalled.
    #[serde(rename = "TR->EN")]
    TrToEn,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::EnToTr => "EN->TR",
            Direction::TrToEn => "TR->EN",
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "EN->TR" => Ok(Direction::EnToTr),
            "TR->EN" => Ok(Direction::TrToEn),
            _ => fail(format!("Invalid review direction: {}", value)),
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Direction::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
