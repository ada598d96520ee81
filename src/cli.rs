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

use clap::Parser;

use crate::cmd::add::add_word;
use crate::cmd::delete::delete_word;
use crate::cmd::list::list_words;
use crate::cmd::remember::remember_words;
use crate::cmd::review::review_words;
use crate::due::LevelBand;
use crate::error::Fallible;
use crate::reinforce::question::Mode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Add a word to the collection.
    Add {
        /// The word being learned.
        term: String,
        /// Its meaning.
        meaning: String,
        /// Difficulty level, 1 to 5.
        #[arg(long)]
        level: Option<u8>,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Delete a word from the collection.
    Delete {
        term: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// List words, optionally searching by term or meaning.
    List {
        /// Only show words whose term or meaning contains this text.
        query: Option<String>,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Review due words, or every word in a level band.
    Review {
        /// Review this level band instead of the words that are due.
        #[arg(long)]
        band: Option<LevelBand>,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Practice missed words until they stick.
    Remember {
        /// The question style to start with.
        #[arg(long, default_value_t = Mode::Typing, value_enum)]
        mode: Mode,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Add {
            term,
            meaning,
            level,
            directory,
        } => add_word(directory, term, meaning, level),
        Command::Delete { term, directory } => delete_word(directory, term),
        Command::List { query, directory } => list_words(directory, query),
        Command::Review { band, directory } => review_words(directory, band),
        Command::Remember { mode, directory } => remember_words(directory, mode),
    }
}
