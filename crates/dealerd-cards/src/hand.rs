//! A participant's hand and its best blackjack total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BUST_THRESHOLD, Card, Rank};

/// An ordered sequence of cards held by the player or the dealer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Creates an empty hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card to the hand.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// The cards in deal order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards held.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns `true` if no cards have been dealt to this hand.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes all cards, ready for the next round.
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// The best blackjack total for this hand.
    ///
    /// Every ace counts 11 first; aces are then demoted to 1 one at a
    /// time while the total exceeds 21, until the total fits or no aces
    /// are left to demote.
    pub fn value(&self) -> u8 {
        let mut total: u16 = self
            .cards
            .iter()
            .map(|card| u16::from(card.base_value()))
            .sum();
        let mut soft_aces =
            self.cards.iter().filter(|c| c.rank == Rank::Ace).count();

        while total > u16::from(BUST_THRESHOLD) && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }

        // Max possible after demotion is 21 cards of value 10, still < 256.
        total.min(u16::from(u8::MAX)) as u8
    }

    /// Returns `true` if the hand's value exceeds 21.
    pub fn is_bust(&self) -> bool {
        self.value() > BUST_THRESHOLD
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for card in &self.cards {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{card}")?;
            first = false;
        }
        write!(f, " ({})", self.value())
    }
}
