#![deny(clippy::unwrap_used, clippy::expect_used)]
pub mod admission;
pub mod reporter;
pub mod server;
pub mod session;
pub mod stats;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unable to open socket for listening")]
    Listen(#[source] io::Error),

    #[error("error accepting connection: {0}")]
    Accept(io::Error),

    #[error("unable to install signal handler: {0}")]
    Signal(io::Error),

    #[error("admission gate closed")]
    GateClosed,
}
