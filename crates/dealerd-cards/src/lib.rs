//! Card and deck model for dealerd.
//!
//! This crate knows nothing about networking or game flow — it provides
//! the value objects the rest of the server builds on:
//!
//! - **Types** ([`Card`], [`Rank`], [`Suit`]) — immutable playing cards.
//! - **Deck** ([`Deck`]) — a shuffled 52-card sequence mutated only by
//!   [`Deck::draw`].
//! - **Hand** ([`Hand`]) — an ordered set of held cards with best-total
//!   blackjack valuation (soft/hard ace handling).
//! - **Errors** ([`DeckError`]) — what can go wrong when drawing.

mod card;
mod deck;
mod hand;

pub use card::{Card, Rank, Suit};
pub use deck::{Deck, DeckError, DECK_SIZE};
pub use hand::Hand;

/// The hand value above which a participant is bust.
pub const BUST_THRESHOLD: u8 = 21;
