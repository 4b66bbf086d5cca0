//! The per-session game state machine.

use dealerd_cards::{Card, Deck, DeckError, Hand};
use dealerd_protocol::Outcome;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::stats::unix_millis;
use crate::{GameError, GameStats, RoundResult};

/// The dealer draws while their hand value is below this.
pub const DEALER_STAND_VALUE: u8 = 17;

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for a valid game request.
    AwaitingRequest,
    /// A round is being played (dealing, hitting, standing).
    RoundInProgress,
    /// The round's turns are over; the result has not been taken yet.
    RoundResolved,
    /// All requested rounds are played.
    GameComplete,
}

impl GamePhase {
    fn name(self) -> &'static str {
        match self {
            GamePhase::AwaitingRequest => "awaiting request",
            GamePhase::RoundInProgress => "round in progress",
            GamePhase::RoundResolved => "round resolved",
            GamePhase::GameComplete => "game complete",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// The cards produced by an initial deal.
///
/// `dealer_hole` exists server-side only — the codec never places it on
/// the wire at deal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialDeal {
    pub player: [Card; 2],
    pub dealer_up: Card,
    pub dealer_hole: Card,
}

/// What a player hit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    /// The card dealt to the player.
    pub card: Card,
    /// The player's hand value after the hit.
    pub hand_value: u8,
    /// `true` if the hit busted the player and resolved the round.
    pub busted: bool,
}

/// The dealer's full turn after the player stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealerPlay {
    /// The revealed hole card.
    pub hole: Card,
    /// Cards the dealer drew, in order. Deterministic for a given deck.
    pub drawn: Vec<Card>,
    /// The dealer's final hand value.
    pub final_value: u8,
    /// `true` if the dealer busted.
    pub busted: bool,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// The state machine for one client's game.
///
/// Owned exclusively by its session handler task; nothing here is
/// shared or locked. All randomness flows from the seed given at
/// construction, so a session's deals are replayable.
pub struct GameSession {
    phase: GamePhase,
    team_name: String,
    rounds_requested: u8,
    round_index: u8,
    rng: StdRng,
    /// The current round's deck. `None` between rounds.
    deck: Option<Deck>,
    player: Hand,
    dealer: Hand,
    stats: GameStats,
}

impl GameSession {
    /// Creates a session whose shuffles are all derived from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::AwaitingRequest,
            team_name: String::new(),
            rounds_requested: 0,
            round_index: 0,
            rng: StdRng::seed_from_u64(seed),
            deck: None,
            player: Hand::new(),
            dealer: Hand::new(),
            stats: GameStats::default(),
        }
    }

    // -- Operations ---------------------------------------------------------

    /// Accepts a game request: records the team and round count and
    /// opens the first round.
    ///
    /// # Errors
    /// - `InvalidState` unless awaiting a request.
    /// - `InvalidRounds` if `rounds` is zero; the session stays in
    ///   `AwaitingRequest` so a corrected request can follow.
    pub fn start_game(
        &mut self,
        team_name: &str,
        rounds: u8,
    ) -> Result<(), GameError> {
        self.expect_phase(GamePhase::AwaitingRequest, "start a game")?;
        if rounds < 1 {
            return Err(GameError::InvalidRounds(rounds));
        }

        self.team_name = team_name.to_string();
        self.rounds_requested = rounds;
        self.stats = GameStats::default();
        self.phase = GamePhase::RoundInProgress;
        Ok(())
    }

    /// Shuffles a fresh deck for the round and deals two cards each.
    ///
    /// Fails `InvalidState` unless a round is in progress with no cards
    /// dealt yet.
    pub fn deal_initial(&mut self) -> Result<InitialDeal, GameError> {
        let deck = Deck::shuffled(&mut self.rng);
        self.deal_initial_with(deck)
    }

    /// Like [`deal_initial`](Self::deal_initial) but plays from a
    /// prearranged deck. Deal order is player, player, dealer upcard,
    /// dealer hole card.
    pub fn deal_initial_with(
        &mut self,
        deck: Deck,
    ) -> Result<InitialDeal, GameError> {
        self.expect_phase(GamePhase::RoundInProgress, "deal")?;
        if !self.player.is_empty() {
            return Err(GameError::InvalidState {
                operation: "deal",
                phase: "round already dealt",
            });
        }

        self.deck = Some(deck);
        let p1 = self.draw()?;
        let p2 = self.draw()?;
        let up = self.draw()?;
        let hole = self.draw()?;

        self.player.push(p1);
        self.player.push(p2);
        self.dealer.push(up);
        self.dealer.push(hole);

        Ok(InitialDeal {
            player: [p1, p2],
            dealer_up: up,
            dealer_hole: hole,
        })
    }

    /// Draws one card into the player's hand.
    ///
    /// On bust the round auto-resolves: the phase moves to
    /// `RoundResolved` and the eventual result is `PlayerBust`.
    pub fn player_hit(&mut self) -> Result<HitResult, GameError> {
        self.expect_phase(GamePhase::RoundInProgress, "hit")?;
        self.expect_dealt("hit")?;

        let card = self.draw()?;
        self.player.push(card);

        let busted = self.player.is_bust();
        if busted {
            self.phase = GamePhase::RoundResolved;
        }
        Ok(HitResult {
            card,
            hand_value: self.player.value(),
            busted,
        })
    }

    /// Ends the player's turn and runs the dealer policy: draw while
    /// the dealer's value is below [`DEALER_STAND_VALUE`].
    ///
    /// The draw sequence is fully determined by the remaining deck, so
    /// repeated plays from the same deck prefix are identical.
    pub fn player_stand(&mut self) -> Result<DealerPlay, GameError> {
        self.expect_phase(GamePhase::RoundInProgress, "stand")?;
        self.expect_dealt("stand")?;

        let hole = self.dealer.cards()[1];
        let mut drawn = Vec::new();
        while self.dealer.value() < DEALER_STAND_VALUE {
            let card = self.draw()?;
            self.dealer.push(card);
            drawn.push(card);
        }

        self.phase = GamePhase::RoundResolved;
        Ok(DealerPlay {
            hole,
            drawn,
            final_value: self.dealer.value(),
            busted: self.dealer.is_bust(),
        })
    }

    /// Produces the round's result and advances the session.
    ///
    /// The outcome is derived from the final hands alone: a busted
    /// player is `PlayerBust` (the dealer's turn never ran), a busted
    /// dealer is `DealerBust`, otherwise the higher value wins and
    /// equal values tie. Advances to the next round, or to
    /// `GameComplete` after the final round.
    pub fn resolve_round(&mut self) -> Result<RoundResult, GameError> {
        self.expect_phase(GamePhase::RoundResolved, "resolve the round")?;

        let outcome = if self.player.is_bust() {
            Outcome::PlayerBust
        } else if self.dealer.is_bust() {
            Outcome::DealerBust
        } else {
            let (p, d) = (self.player.value(), self.dealer.value());
            if p > d {
                Outcome::PlayerWin
            } else if p < d {
                Outcome::DealerWin
            } else {
                Outcome::Tie
            }
        };

        let result = RoundResult {
            round: self.round_index,
            outcome,
            player_value: self.player.value(),
            dealer_value: self.dealer.value(),
            player_cards: self.player.cards().to_vec(),
            dealer_cards: self.dealer.cards().to_vec(),
            resolved_at_ms: unix_millis(),
        };
        self.stats.record_round(result.clone());

        self.round_index += 1;
        if self.round_index >= self.rounds_requested {
            self.phase = GamePhase::GameComplete;
        } else {
            self.player.clear();
            self.dealer.clear();
            self.deck = None;
            self.phase = GamePhase::RoundInProgress;
        }

        Ok(result)
    }

    // -- Accessors ----------------------------------------------------------

    /// The session's current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The requesting team's name.
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// How many rounds the client asked for.
    pub fn rounds_requested(&self) -> u8 {
        self.rounds_requested
    }

    /// Zero-based index of the current (or next) round.
    pub fn round_index(&self) -> u8 {
        self.round_index
    }

    /// The player's current hand.
    pub fn player_hand(&self) -> &Hand {
        &self.player
    }

    /// The dealer's current hand, hole card included.
    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    /// The accumulated statistics.
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Mutable statistics, for the handler's decision timings.
    pub fn stats_mut(&mut self) -> &mut GameStats {
        &mut self.stats
    }

    /// Consumes the session and yields its statistics, for building the
    /// stored game record after `GameComplete`.
    pub fn into_stats(self) -> GameStats {
        self.stats
    }

    // -- Internals ----------------------------------------------------------

    fn expect_phase(
        &self,
        expected: GamePhase,
        operation: &'static str,
    ) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                operation,
                phase: self.phase.name(),
            })
        }
    }

    fn expect_dealt(&self, operation: &'static str) -> Result<(), GameError> {
        if self.player.len() >= 2 {
            Ok(())
        } else {
            Err(GameError::InvalidState {
                operation,
                phase: "round not dealt",
            })
        }
    }

    /// Draws the next card, rebuilding the deck if it ran out.
    ///
    /// Exhaustion policy: the deck is rebuilt from the 52-card set minus
    /// every card in the two active hands, shuffled by the session RNG.
    /// Deterministic per session seed.
    fn draw(&mut self) -> Result<Card, GameError> {
        let exhausted = self.deck.as_ref().is_none_or(Deck::is_empty);
        if exhausted {
            if self.deck.is_some() {
                tracing::debug!(
                    round = self.round_index,
                    "deck exhausted mid-round, reshuffling unseen cards"
                );
            }
            let mut held: Vec<Card> = self.player.cards().to_vec();
            held.extend_from_slice(self.dealer.cards());
            let fresh = Deck::shuffled_excluding(&mut self.rng, &held);
            self.deck = Some(fresh);
        }

        self.deck
            .as_mut()
            .expect("deck was just replenished")
            .draw()
            .map_err(|DeckError::Empty| GameError::DeckEmpty)
    }
}
