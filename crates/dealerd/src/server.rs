//! Server assembly and accept loop.
//!
//! [`DealerdServer`] ties the pieces together: a TCP listener for game
//! sessions, the UDP offer broadcaster, and the storage backend every
//! finished game is written to. Construction goes through
//! [`ServerBuilder`] so callers only name the knobs they care about.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use dealerd_storage::GameStore;
use tokio::net::TcpListener;

use crate::ServerError;
use crate::broadcast::broadcast_offers;
use crate::config::ServerConfig;
use crate::handler::handle_connection;

/// Shared server-wide state. Cloned into every connection task via
/// `Arc`; sessions themselves live entirely inside their own task.
pub(crate) struct ServerState<S> {
    pub(crate) store: S,
    pub(crate) config: ServerConfig,
    /// Live connection count, for log visibility only.
    pub(crate) active: AtomicUsize,
}

/// Builder for [`DealerdServer`]. Starts from [`ServerConfig::default`]
/// and overrides field by field.
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the TCP listener binds to, e.g. `"0.0.0.0:8080"`.
    /// Port 0 picks an ephemeral port; see [`DealerdServer::local_addr`].
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// Name carried in discovery offers. Truncated on the wire to the
    /// 32-byte name field.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.config.server_name = name.into();
        self
    }

    /// UDP port offers are sent to.
    pub fn broadcast_port(mut self, port: u16) -> Self {
        self.config.broadcast_port = port;
        self
    }

    /// Destination address for offers. Defaults to the limited
    /// broadcast address; loopback is handy under test.
    pub fn broadcast_addr(mut self, addr: Ipv4Addr) -> Self {
        self.config.broadcast_addr = addr;
        self
    }

    /// Delay between consecutive offers.
    pub fn broadcast_interval(mut self, interval: Duration) -> Self {
        self.config.broadcast_interval = interval;
        self
    }

    /// Replaces the whole configuration at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and assembles the server around `store`.
    pub async fn build<S: GameStore>(
        self,
        store: S,
    ) -> Result<DealerdServer<S>, ServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        Ok(DealerdServer {
            listener,
            state: Arc::new(ServerState {
                store,
                config: self.config,
                active: AtomicUsize::new(0),
            }),
        })
    }
}

/// A bound, ready-to-run game server.
pub struct DealerdServer<S> {
    listener: TcpListener,
    state: Arc<ServerState<S>>,
}

impl DealerdServer<()> {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }
}

impl<S: GameStore> DealerdServer<S> {
    /// The address the listener actually bound, useful when the
    /// configured port was 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the broadcaster and the accept loop until the listener
    /// fails. Each accepted connection gets its own task; a session
    /// that errors out takes down nothing but itself.
    pub async fn run(self) -> Result<(), ServerError> {
        let tcp_port = self.listener.local_addr()?.port();
        tokio::spawn(broadcast_offers(self.state.config.clone(), tcp_port));

        loop {
            let (stream, addr) = self.listener.accept().await?;
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, state).await {
                    tracing::debug!(%addr, error = %e, "session ended with error");
                }
            });
        }
    }
}
