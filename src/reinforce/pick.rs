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

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::word::WordId;

/// Pick a random id, avoiding `avoid` whenever another candidate exists.
pub fn pick_random_id<R: Rng + ?Sized>(
    candidates: &[WordId],
    avoid: Option<&WordId>,
    rng: &mut R,
) -> Option<WordId> {
    if candidates.len() <= 1 {
        return candidates.first().cloned();
    }
    let allowed: Vec<&WordId> = candidates
        .iter()
        .filter(|id| Some(*id) != avoid)
        .collect();
    if allowed.is_empty() {
        // Every candidate is the avoided id.
        return candidates.first().cloned();
    }
    allowed.choose(rng).map(|id| (*id).clone())
}
