//! Server configuration.

use std::net::Ipv4Addr;
use std::time::Duration;

/// Runtime configuration for a [`DealerdServer`](crate::DealerdServer).
///
/// The server takes no other runtime configuration: game rules are
/// fixed, and per-session behavior is driven entirely by the client's
/// own game request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    /// The display name carried in discovery offers. Truncated to the
    /// protocol's 32-byte name field on the wire.
    pub server_name: String,

    /// UDP port discovery offers are sent to.
    pub broadcast_port: u16,

    /// Address discovery offers are sent to. The broadcast address in
    /// production; tests point it at loopback.
    pub broadcast_addr: Ipv4Addr,

    /// How often an offer is broadcast.
    pub broadcast_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            server_name: "dealerd".to_string(),
            broadcast_port: 13122,
            broadcast_addr: Ipv4Addr::BROADCAST,
            broadcast_interval: Duration::from_secs(1),
        }
    }
}
