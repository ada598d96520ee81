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

use crate::types::direction::Direction;
use crate::types::grade::Grade;
use crate::types::timestamp::Timestamp;
use crate::types::word::WordId;

/// An immutable record of one graded review. Log entries are only ever
/// appended.
#[derive(Clone, PartialEq, Debug)]
pub struct ReviewLogEntry {
    pub word_id: WordId,
    pub grade: Grade,
    pub direction: Direction,
    pub reviewed_at: Timestamp,
}
