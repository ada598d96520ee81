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

use crate::collection::Collection;
use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail_with;

/// Delete a word by term. Its id is dropped from the reinforcement list the
/// next time a reinforcement session opens.
pub fn delete_word(directory: Option<String>, term: String) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let Some(word) = collection.db.find_by_term(&term)? else {
        return fail_with(ErrorKind::NotFound, format!("no such word: {}", term.trim()));
    };
    collection.db.delete_word(&word.id)?;
    println!("Deleted {}.", word.term);
    Ok(())
}
