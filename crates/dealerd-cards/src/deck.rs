//! A shuffled deck of 52 cards.
//!
//! The deck does not own a random source — the caller passes an `Rng` at
//! shuffle time. Game sessions hold a seeded `StdRng`, which makes every
//! shuffle in a session reproducible from its seed.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Card, Rank, Suit};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Errors raised by deck operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeckError {
    /// No cards remain. Whether to reshuffle or abort is the caller's
    /// policy — the deck never reshuffles on its own.
    #[error("deck is empty")]
    Empty,
}

/// An ordered sequence of cards, mutated only by [`Deck::draw`].
#[derive(Debug, Clone)]
pub struct Deck {
    /// Remaining cards; the top of the deck is the end of the vec.
    cards: Vec<Card>,
}

impl Deck {
    /// Builds a full 52-card deck shuffled by `rng`.
    pub fn shuffled(rng: &mut impl Rng) -> Self {
        Self::shuffled_excluding(rng, &[])
    }

    /// Builds a deck from the 52-card set minus `exclude`, shuffled by `rng`.
    ///
    /// Used when a round exhausts the deck: the unseen cards are
    /// reshuffled while the cards already held in active hands stay out.
    pub fn shuffled_excluding(rng: &mut impl Rng, exclude: &[Card]) -> Self {
        let mut cards: Vec<Card> = Suit::ALL
            .iter()
            .flat_map(|&suit| {
                Rank::ALL.iter().map(move |&rank| Card::new(rank, suit))
            })
            .filter(|card| !exclude.contains(card))
            .collect();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Builds a prearranged deck that deals `cards` in the given order.
    ///
    /// No shuffling happens; the first element is the first card drawn.
    /// Used for scripted rounds in tests and replays.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self { cards }
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Empty)
    }

    /// Number of cards left.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Returns `true` if no cards remain.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_full_deck_yields_52_distinct_cards_then_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::shuffled(&mut rng);
        assert_eq!(deck.remaining(), DECK_SIZE);

        let mut seen = HashSet::new();
        for _ in 0..DECK_SIZE {
            let card = deck.draw().expect("deck should not be empty yet");
            assert!(seen.insert(card), "duplicate card drawn: {card}");
        }
        assert_eq!(seen.len(), DECK_SIZE);
        assert_eq!(deck.draw(), Err(DeckError::Empty));
    }

    #[test]
    fn test_same_seed_produces_same_order() {
        let mut a = Deck::shuffled(&mut StdRng::seed_from_u64(42));
        let mut b = Deck::shuffled(&mut StdRng::seed_from_u64(42));
        for _ in 0..DECK_SIZE {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_different_seeds_produce_different_order() {
        let mut a = Deck::shuffled(&mut StdRng::seed_from_u64(1));
        let mut b = Deck::shuffled(&mut StdRng::seed_from_u64(2));
        let draws_a: Vec<_> = (0..DECK_SIZE).map(|_| a.draw().unwrap()).collect();
        let draws_b: Vec<_> = (0..DECK_SIZE).map(|_| b.draw().unwrap()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_from_cards_deals_in_given_order() {
        let script = [
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Nine, Suit::Spades),
            Card::new(Rank::Six, Suit::Clubs),
        ];
        let mut deck = Deck::from_cards(script);
        assert_eq!(deck.draw(), Ok(script[0]));
        assert_eq!(deck.draw(), Ok(script[1]));
        assert_eq!(deck.draw(), Ok(script[2]));
        assert_eq!(deck.draw(), Err(DeckError::Empty));
    }

    #[test]
    fn test_shuffled_excluding_leaves_out_held_cards() {
        let held = [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Six, Suit::Clubs),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let mut deck = Deck::shuffled_excluding(&mut rng, &held);
        assert_eq!(deck.remaining(), DECK_SIZE - held.len());
        while let Ok(card) = deck.draw() {
            assert!(!held.contains(&card));
        }
    }
}
