//! The TCP listener and accept loop.

use std::sync::Arc;

use log::{debug, info};
use tokio::net::TcpListener;

use saltmine_core::crypt::CryptEngine;
use saltmine_core::dictionary::Dictionary;

use crate::ServerError;
use crate::admission::ConnectionGate;
use crate::reporter::spawn_reporter;
use crate::session::handle_session;
use crate::stats::Stats;

/// A bound, not-yet-running server. Binding is separate from running so
/// the caller can learn the resolved port (port 0 asks the kernel for an
/// ephemeral one) before the accept loop starts.
pub struct Server {
    listener: TcpListener,
    gate: ConnectionGate,
    dictionary: Arc<Dictionary>,
    engine: Arc<dyn CryptEngine>,
    stats: Arc<Stats>,
}

impl Server {
    /// Binds the listening socket on all interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Listen`] if the socket cannot be bound or
    /// its local address cannot be resolved.
    pub async fn bind(
        port: u16,
        maxconn: u32,
        dictionary: Arc<Dictionary>,
        engine: Arc<dyn CryptEngine>,
    ) -> Result<Server, ServerError> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(ServerError::Listen)?;
        info!(
            "listening on port {} (maxconn {})",
            listener.local_addr().map_err(ServerError::Listen)?.port(),
            maxconn,
        );

        Ok(Server {
            listener,
            gate: ConnectionGate::new(maxconn),
            dictionary,
            engine,
            stats: Arc::new(Stats::new()),
        })
    }

    /// The port actually bound; meaningful when the server was asked for
    /// an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Listen`] if the local address cannot be
    /// resolved.
    pub fn local_port(&self) -> Result<u16, ServerError> {
        Ok(self
            .listener
            .local_addr()
            .map_err(ServerError::Listen)?
            .port())
    }

    /// The statistics registry shared with every session; the reporter
    /// and tests read it.
    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Runs the server: install the signal reporter, then accept clients
    /// forever. A permit is taken from the admission gate before each
    /// `accept`, so backpressure lands on the kernel accept queue.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Signal`] if the reporter cannot be
    /// installed and [`ServerError::Accept`] if `accept` fails.
    pub async fn run(self) -> Result<(), ServerError> {
        spawn_reporter(Arc::clone(&self.stats))?;

        loop {
            let permit = self.gate.acquire().await?;
            let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
            debug!("accepted connection from {peer}");

            tokio::spawn(handle_session(
                stream,
                Arc::clone(&self.dictionary),
                Arc::clone(&self.engine),
                Arc::clone(&self.stats),
                permit,
            ));
        }
    }
}
