//! Immutable playing-card value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// The rank of a playing card.
///
/// Discriminants are the wire indices (0–12) used by the binary protocol,
/// ordered `2..10, J, Q, K, A`. They must never be reordered — clients
/// decode cards by index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Rank {
    Two = 0,
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
}

impl Rank {
    /// All ranks in wire-index order.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Returns the wire index (0–12) for this rank.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a rank by its wire index.
    pub fn from_index(index: u8) -> Option<Rank> {
        Rank::ALL.get(usize::from(index)).copied()
    }

    /// The blackjack value of this rank counting an ace high.
    ///
    /// Aces start at 11; hand valuation demotes them to 1 as needed
    /// (see [`Hand::value`](crate::Hand::value)).
    pub fn base_value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            other => other.index() + 2,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            other => return write!(f, "{}", other.index() + 2),
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

/// The suit of a playing card. Discriminants are wire indices (0–3).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    /// All suits in wire-index order.
    pub const ALL: [Suit; 4] =
        [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    /// Returns the wire index (0–3) for this suit.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a suit by its wire index.
    pub fn from_index(index: u8) -> Option<Suit> {
        Suit::ALL.get(usize::from(index)).copied()
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Suit::Hearts => "H",
            Suit::Diamonds => "D",
            Suit::Clubs => "C",
            Suit::Spades => "S",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single playing card: rank plus suit. Cheap to copy, never mutated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// Creates a card from rank and suit.
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// The card's blackjack value counting an ace as 11.
    pub fn base_value(self) -> u8 {
        self.rank.base_value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}
