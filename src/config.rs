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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::direction::Direction;

pub const CONFIG_FILE: &str = "vocab.toml";

const DEFAULT_LIMIT: usize = 50;

/// Collection settings, read from `vocab.toml` in the collection directory.
/// Every key is optional.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Most words a due review loads.
    pub due_limit: usize,
    /// Most words a level-band review loads.
    pub level_limit: usize,
    /// Direction recorded with each review.
    pub direction: Direction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            due_limit: DEFAULT_LIMIT,
            level_limit: DEFAULT_LIMIT,
            direction: Direction::default(),
        }
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE}, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        Self::parse(&content).map_err(|e| {
            ErrorReport::new(format!("failed to parse {}: {}", path.display(), e.message()))
        })
    }

    fn parse(content: &str) -> Fallible<Self> {
        Ok(toml::from_str(content)?)
    }
}
