//! The SIGHUP statistics reporter.
//!
//! A single dedicated task owns the signal stream, so the dump signal is
//! observed by exactly one place in the process. The report goes straight
//! to stderr, not through the logger, because external tooling parses it.

use std::sync::Arc;

use log::{debug, error};
use tokio::signal::unix::{SignalKind, signal};

use crate::ServerError;
use crate::stats::{Stats, StatsSnapshot};

/// Renders the statistics block exactly as dumped on each signal.
pub fn format_report(snapshot: &StatsSnapshot) -> String {
    format!(
        "Connected clients: {}\nCompleted clients: {}\nCrack requests: {}\n\
         Failed crack requests: {}\nSuccessful crack requests: {}\n\
         Crypt requests: {}\ncrypt()/crypt_r() calls: {}\n",
        snapshot.connected,
        snapshot.completed,
        snapshot.cracks,
        snapshot.failed_cracks,
        snapshot.success_cracks,
        snapshot.crypts,
        snapshot.crypt_calls,
    )
}

/// Spawns the reporter task: wait for SIGHUP, snapshot, dump, repeat.
/// The task never terminates the process.
///
/// # Errors
///
/// Returns [`ServerError::Signal`] if the SIGHUP stream cannot be
/// installed.
pub fn spawn_reporter(stats: Arc<Stats>) -> Result<(), ServerError> {
    let mut hangup = signal(SignalKind::hangup()).map_err(ServerError::Signal)?;

    tokio::spawn(async move {
        loop {
            if hangup.recv().await.is_none() {
                error!("SIGHUP stream closed; reporter exiting");
                return;
            }
            debug!("dump signal received");
            eprint!("{}", format_report(&stats.snapshot()));
        }
    });

    Ok(())
}
