#![deny(clippy::unwrap_used, clippy::expect_used)]
pub mod dialogue;
pub mod job;

use thiserror::Error;

/// Client-side failures, each mapping to one exit code in the binary.
/// Display text is the operator-facing message; the binary prefixes its
/// program name.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unable to open job file \"{0}\"")]
    JobFileOpen(String),

    #[error("unable to connect to port {0}")]
    Connect(String),

    #[error("server connection terminated")]
    Terminated,
}
