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

use crate::error::ErrorKind;
use crate::error::ErrorReport;

/// The learner's self-assessed recall quality for one review.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grade {
    Fail,
    Hard,
    Easy,
}

impl Grade {
    pub fn as_u8(self) -> u8 {
        match self {
            Grade::Fail => 0,
            Grade::Hard => 3,
            Grade::Easy => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Fail => "fail",
            Grade::Hard => "hard",
            Grade::Easy => "easy",
        }
    }

    /// Anything below `Easy` sends the word to the reinforcement list.
    pub fn needs_reinforcement(self) -> bool {
        self != Grade::Easy
    }
}

impl TryFrom<u8> for Grade {
    type Error = ErrorReport;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Grade::Fail),
            3 => Ok(Grade::Hard),
            5 => Ok(Grade::Easy),
            _ => Err(ErrorReport::with_kind(
                ErrorKind::InvalidGrade,
                format!("invalid grade: {value} (expected 0, 3, or 5)"),
            )),
        }
    }
}

impl ToSql for Grade {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_u8()))
    }
}

impl FromSql for Grade {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let value: u8 = FromSql::column_result(value)?;
        Grade::try_from(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
