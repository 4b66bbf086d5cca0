//! UDP discovery broadcaster.
//!
//! Announces the server on the LAN with a fixed-interval offer packet
//! so clients can find the TCP port without configuration. The loop is
//! deliberately unkillable: a send failure is worth a log line, never
//! worth going dark.

use dealerd_protocol::{Message, encode};

use crate::config::ServerConfig;

/// Broadcasts offer packets forever. Spawned once per server; the task
/// dies with the runtime.
pub(crate) async fn broadcast_offers(config: ServerConfig, tcp_port: u16) {
    let socket = match tokio::net::UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::error!(error = %e, "could not bind broadcast socket");
            return;
        }
    };
    if let Err(e) = socket.set_broadcast(true) {
        tracing::error!(error = %e, "could not enable broadcast");
        return;
    }

    // The offer never changes, so encode it once.
    let offer = encode(&Message::Offer {
        tcp_port,
        server_name: config.server_name.clone(),
    });
    let target = (config.broadcast_addr, config.broadcast_port);
    tracing::info!(
        port = config.broadcast_port,
        tcp_port,
        name = %config.server_name,
        "broadcasting offers"
    );

    let mut ticker = tokio::time::interval(config.broadcast_interval);
    loop {
        ticker.tick().await;
        if let Err(e) = socket.send_to(&offer, target).await {
            tracing::warn!(error = %e, "offer broadcast failed");
        }
    }
}
