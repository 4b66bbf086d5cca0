//! # dealerd
//!
//! A concurrent blackjack game server: UDP discovery offers, a binary
//! TCP gameplay protocol, and one isolated game session per connected
//! client.
//!
//! The crate ties the layers together: protocol → engine → session
//! handler → server, with an injected [`GameStore`] receiving each
//! finished game's record.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use dealerd::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServerError> {
//!     let store = JsonStore::new("games.jsonl");
//!     let server = DealerdServer::builder()
//!         .bind("0.0.0.0:8080")
//!         .server_name("Cool Server Name")
//!         .build(store)
//!         .await?;
//!     server.run().await
//! }
//! ```

mod broadcast;
mod config;
mod conn;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{DealerdServer, ServerBuilder};

/// The common imports for building and running a server.
pub mod prelude {
    pub use crate::{DealerdServer, ServerBuilder, ServerConfig, ServerError};
    pub use dealerd_cards::{Card, Deck, Hand, Rank, Suit};
    pub use dealerd_engine::{GameError, GamePhase, GameSession};
    pub use dealerd_protocol::{
        Decision, GameErrorCode, Message, Outcome, ProtocolError,
    };
    pub use dealerd_storage::{
        GameRecord, GameStore, JsonStore, MemoryStore, RecordFilter,
        StorageError,
    };
}
