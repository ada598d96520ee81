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

//! A vocabulary trainer: spaced-repetition review of words, with missed
//! words rotated through a reinforcement drill until they are answered
//! correctly three times in a row.

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod db;
pub mod due;
pub mod error;
#[cfg(test)]
mod helper;
pub mod reinforce;
pub mod review;
pub mod srs;
pub mod store;
pub mod types;
