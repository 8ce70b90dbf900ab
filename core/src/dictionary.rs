use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::SaltmineError;

/// Longest candidate plaintext the crypt(3) primitive looks at.
pub const MAX_WORD_LENGTH: usize = 8;

/// Immutable list of candidate plaintext words, loaded once at startup and
/// shared read-only by every session.
#[derive(Debug)]
pub struct Dictionary {
    words: Vec<String>,
}

impl Dictionary {
    /// Loads the word list from `path`, one word per line. Lines longer than
    /// [`MAX_WORD_LENGTH`] bytes and empty lines are silently dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SaltmineError::DictionaryOpen`] if the file cannot be read
    /// and [`SaltmineError::EmptyDictionary`] if no usable words remain.
    pub fn load(path: &Path) -> Result<Dictionary, SaltmineError> {
        let file = File::open(path)
            .map_err(|_| SaltmineError::DictionaryOpen(path.display().to_string()))?;

        let mut words = Vec::new();
        for line in BufReader::new(file).lines() {
            let line =
                line.map_err(|_| SaltmineError::DictionaryOpen(path.display().to_string()))?;
            if line.is_empty() || line.len() > MAX_WORD_LENGTH {
                continue;
            }
            words.push(line);
        }

        if words.is_empty() {
            return Err(SaltmineError::EmptyDictionary);
        }
        info!("loaded {} words from {}", words.len(), path.display());

        Ok(Dictionary { words })
    }

    /// Builds a dictionary directly from in-memory words, applying the same
    /// length filter as [`Dictionary::load`].
    pub fn from_words<I, S>(words: I) -> Result<Dictionary, SaltmineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w| !w.is_empty() && w.len() <= MAX_WORD_LENGTH)
            .collect();

        if words.is_empty() {
            return Err(SaltmineError::EmptyDictionary);
        }
        Ok(Dictionary { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, index: usize) -> &str {
        &self.words[index]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}
