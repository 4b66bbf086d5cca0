//! Per-session statistics: round results and decision timings.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dealerd_cards::Card;
use dealerd_protocol::Outcome;
use serde::{Deserialize, Serialize};

/// The immutable record of one finished round.
///
/// Created by [`GameSession::resolve_round`](crate::GameSession::resolve_round)
/// and never mutated afterwards; the storage layer persists these as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Zero-based round index within the session.
    pub round: u8,
    /// How the round ended.
    pub outcome: Outcome,
    /// Final best value of the player's hand.
    pub player_value: u8,
    /// Final best value of the dealer's hand.
    pub dealer_value: u8,
    /// The player's full hand in deal order.
    pub player_cards: Vec<Card>,
    /// The dealer's full hand in deal order.
    pub dealer_cards: Vec<Card>,
    /// When the round resolved, in milliseconds since the Unix epoch.
    pub resolved_at_ms: u64,
}

/// Milliseconds since the Unix epoch, clamped to zero for clocks set
/// before 1970.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Accumulated statistics for one session.
///
/// Filled in round by round; the session handler adds decision timings
/// as they are measured and flushes the whole thing into a stored game
/// record when the session completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStats {
    /// Rounds the player won (including dealer busts).
    pub player_wins: u8,
    /// Rounds the dealer won (including player busts).
    pub dealer_wins: u8,
    /// Rounds that tied.
    pub ties: u8,
    /// Every finished round, in order.
    pub rounds: Vec<RoundResult>,
    /// Total hit/stand decisions the player made.
    pub decisions: u32,
    /// Time the player took for each decision, in order.
    pub decision_times: Vec<Duration>,
}

impl GameStats {
    /// Folds a finished round into the tallies.
    pub(crate) fn record_round(&mut self, result: RoundResult) {
        if result.outcome.is_player_win() {
            self.player_wins += 1;
        } else if result.outcome.is_dealer_win() {
            self.dealer_wins += 1;
        } else {
            self.ties += 1;
        }
        self.rounds.push(result);
    }

    /// Records one player decision and how long it took.
    pub fn record_decision(&mut self, took: Duration) {
        self.decisions += 1;
        self.decision_times.push(took);
    }

    /// Sum of all recorded decision times.
    pub fn total_decision_time(&self) -> Duration {
        self.decision_times.iter().sum()
    }
}
