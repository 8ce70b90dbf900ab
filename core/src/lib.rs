#![deny(clippy::unwrap_used, clippy::expect_used)]
pub mod crack;
pub mod crypt;
pub mod dictionary;
pub mod protocol;

use thiserror::Error;

/// Errors produced by the core crate: dictionary loading, the crypt
/// primitive, and the crack worker pool.
///
/// The display text of the dictionary variants is the operator-facing
/// message; binaries prefix their own program name.
#[derive(Debug, Error)]
pub enum SaltmineError {
    #[error("unable to open dictionary file \"{0}\"")]
    DictionaryOpen(String),

    #[error("no plain text words to test")]
    EmptyDictionary,

    #[error("crypt primitive failure: {0}")]
    Crypt(String),

    #[error("crack worker thread failed to join")]
    WorkerJoin,
}
