//! Core protocol types for dealerd's wire format.
//!
//! This module defines every message that travels on the wire, plus the
//! small enums embedded in their payloads. The set is closed: a frame
//! decodes into exactly one [`Message`] variant, and the session handler
//! matches on it exhaustively. There is no "unknown but tolerated"
//! message — an unrecognized tag is a decode error.

use std::fmt;

use dealerd_cards::Card;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Decision — the player's move
// ---------------------------------------------------------------------------

/// A player's move during their turn.
///
/// Wire form is a single byte; the discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Decision {
    /// Draw another card.
    Hit = 0x01,
    /// End the turn and hand play to the dealer.
    Stand = 0x02,
}

impl Decision {
    /// Returns the wire byte for this decision.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte into a decision.
    pub fn from_wire(byte: u8) -> Option<Decision> {
        match byte {
            0x01 => Some(Decision::Hit),
            0x02 => Some(Decision::Stand),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Hit => write!(f, "hit"),
            Decision::Stand => write!(f, "stand"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome — how a round ended
// ---------------------------------------------------------------------------

/// The outcome of a finished round, from the player's perspective.
///
/// Wire form is a single byte. `Tie`, `DealerWin` and `PlayerWin` keep
/// the original protocol's result constants (0x01–0x03); the bust
/// variants distinguish how a win came about, which the stored records
/// and the client UI both care about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Outcome {
    /// Equal totals after both turns.
    Tie = 0x01,
    /// Dealer's total beat the player's.
    DealerWin = 0x02,
    /// Player's total beat the dealer's.
    PlayerWin = 0x03,
    /// Player exceeded 21; the dealer's turn never ran.
    PlayerBust = 0x04,
    /// Dealer exceeded 21 after the player stood.
    DealerBust = 0x05,
}

impl Outcome {
    /// Returns the wire byte for this outcome.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte into an outcome.
    pub fn from_wire(byte: u8) -> Option<Outcome> {
        match byte {
            0x01 => Some(Outcome::Tie),
            0x02 => Some(Outcome::DealerWin),
            0x03 => Some(Outcome::PlayerWin),
            0x04 => Some(Outcome::PlayerBust),
            0x05 => Some(Outcome::DealerBust),
            _ => None,
        }
    }

    /// Returns `true` if the round counts as a player win.
    pub fn is_player_win(self) -> bool {
        matches!(self, Outcome::PlayerWin | Outcome::DealerBust)
    }

    /// Returns `true` if the round counts as a dealer win.
    pub fn is_dealer_win(self) -> bool {
        matches!(self, Outcome::DealerWin | Outcome::PlayerBust)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Tie => "tie",
            Outcome::DealerWin => "dealer win",
            Outcome::PlayerWin => "player win",
            Outcome::PlayerBust => "player bust",
            Outcome::DealerBust => "dealer bust",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// GameErrorCode — recoverable errors surfaced to the client
// ---------------------------------------------------------------------------

/// A recoverable game-level error, carried in a [`Message::GameError`].
///
/// Unlike a protocol error (which kills the connection), these tell a
/// well-behaved client "that operation was not valid right now" and let
/// the session continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameErrorCode {
    /// The operation is not valid in the session's current state.
    InvalidState = 0x01,
    /// A draw was requested with no cards left to deal.
    DeckEmpty = 0x02,
}

impl GameErrorCode {
    /// Returns the wire byte for this code.
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte into an error code.
    pub fn from_wire(byte: u8) -> Option<GameErrorCode> {
        match byte {
            0x01 => Some(GameErrorCode::InvalidState),
            0x02 => Some(GameErrorCode::DeckEmpty),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Message — the closed set of wire messages
// ---------------------------------------------------------------------------

/// Every message that can appear on the wire, UDP or TCP.
///
/// Each variant has a fixed type tag and a fixed payload layout; see the
/// [codec](crate::encode) for the exact byte positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Server → broadcast (UDP): "a game server is here."
    /// Carries the TCP port to connect to and the server's display name.
    Offer { tcp_port: u16, server_name: String },

    /// Client → Server: "start a game for this team, this many rounds."
    GameRequest { rounds: u8, team_name: String },

    /// Server → Client: whether the game request was accepted.
    /// A rejected request leaves the connection open so the client can
    /// send a corrected one.
    GameStartAck { accepted: bool },

    /// Server → Client: the initial deal for a round — both player
    /// cards and the dealer's upcard. The dealer's second card exists
    /// server-side but stays off the wire until the dealer's turn.
    RoundDeal {
        player: [Card; 2],
        dealer_up: Card,
    },

    /// Client → Server: hit or stand.
    PlayerDecision(Decision),

    /// Server → Client: a single card dealt mid-round. Context decides
    /// whose it is: a reply to a hit is the player's, cards after a
    /// stand are the dealer's (the first being the revealed hole card).
    CardDeal(Card),

    /// Server → Client: the round is over.
    RoundResult {
        outcome: Outcome,
        player_value: u8,
        dealer_value: u8,
    },

    /// Server → Client: all rounds played; aggregate tallies.
    GameOver {
        player_wins: u8,
        dealer_wins: u8,
        ties: u8,
    },

    /// Server → Client: a recoverable game error. The session stays up.
    GameError(GameErrorCode),
}

impl Message {
    /// The wire type tag for this message.
    pub fn type_tag(&self) -> u8 {
        match self {
            Message::Offer { .. } => 0x02,
            Message::GameRequest { .. } => 0x03,
            Message::GameStartAck { .. } => 0x04,
            Message::RoundDeal { .. } => 0x05,
            Message::PlayerDecision(_) => 0x06,
            Message::CardDeal(_) => 0x07,
            Message::RoundResult { .. } => 0x08,
            Message::GameOver { .. } => 0x09,
            Message::GameError(_) => 0x0A,
        }
    }
}
