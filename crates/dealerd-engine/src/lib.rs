//! Game engine for dealerd: the per-session blackjack state machine.
//!
//! One [`GameSession`] drives one client's game from request to
//! completion. It is pure — no sockets, no clocks beyond result
//! timestamps, no shared state. The session handler feeds it decoded
//! protocol messages and turns its results back into wire messages.
//!
//! # State machine
//!
//! ```text
//! AwaitingRequest ──start_game──▶ RoundInProgress
//!      ▲                              │ player_hit (bust) /
//!      │                              │ player_stand
//!      │                              ▼
//!      │                         RoundResolved ──resolve_round──▶
//!      │                              │          next round │ GameComplete
//!      └──────── (new session) ◀──────┘
//! ```
//!
//! Every operation validates the current phase; wrong-phase calls fail
//! with [`GameError::InvalidState`] and change nothing.

mod error;
mod session;
mod stats;

pub use error::GameError;
pub use session::{
    DEALER_STAND_VALUE, DealerPlay, GamePhase, GameSession, HitResult,
    InitialDeal,
};
pub use stats::{GameStats, RoundResult};
