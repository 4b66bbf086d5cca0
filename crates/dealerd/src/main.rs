//! dealerd binary: a blackjack game server with LAN discovery.
//!
//! Configuration comes from the environment:
//! - `DEALERD_ADDR`  — TCP bind address (default `0.0.0.0:8080`)
//! - `DEALERD_NAME`  — server name carried in discovery offers
//! - `DEALERD_DB`    — path to the JSON-lines game record file
//! - `RUST_LOG`      — log filter, standard `tracing` syntax

use dealerd::{DealerdServer, ServerError};
use dealerd_storage::JsonStore;
use tracing_subscriber::EnvFilter;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = JsonStore::new(env_or("DEALERD_DB", "games.jsonl"));
    let server = DealerdServer::builder()
        .bind(env_or("DEALERD_ADDR", "0.0.0.0:8080"))
        .server_name(env_or("DEALERD_NAME", "dealerd"))
        .build(store)
        .await?;

    server.run().await
}
