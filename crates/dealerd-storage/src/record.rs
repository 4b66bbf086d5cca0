//! The persisted game record and the query filter over stored records.

use std::time::Duration;

use dealerd_engine::{GameStats, RoundResult};
use serde::{Deserialize, Serialize};

/// The finalized summary of one completed session.
///
/// Created once when a game completes and handed to the store
/// immutably — nothing mutates a record after handoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// The team that played the game.
    pub team_name: String,
    /// Rounds the client asked for (equals `rounds.len()` for a game
    /// that ran to completion).
    pub rounds_requested: u8,
    /// Rounds the player won, dealer busts included.
    pub player_wins: u8,
    /// Rounds the dealer won, player busts included.
    pub dealer_wins: u8,
    /// Rounds that tied.
    pub ties: u8,
    /// Every round's result, in play order.
    pub rounds: Vec<RoundResult>,
    /// Hit/stand decisions the player made over the whole game.
    pub decisions: u32,
    /// Total time the player spent deciding, in milliseconds.
    pub total_decision_time_ms: u64,
    /// Wall-clock duration of the whole game, in milliseconds.
    pub game_duration_ms: u64,
    /// Bytes the server sent to this client.
    pub bytes_sent: u64,
    /// Bytes the server received from this client.
    pub bytes_received: u64,
}

impl GameRecord {
    /// Builds a record from a completed session's statistics plus the
    /// connection-level measurements the handler kept.
    pub fn from_stats(
        team_name: String,
        rounds_requested: u8,
        stats: GameStats,
        game_duration: Duration,
        bytes_sent: u64,
        bytes_received: u64,
    ) -> Self {
        Self {
            team_name,
            rounds_requested,
            player_wins: stats.player_wins,
            dealer_wins: stats.dealer_wins,
            ties: stats.ties,
            decisions: stats.decisions,
            total_decision_time_ms: stats.total_decision_time().as_millis()
                as u64,
            rounds: stats.rounds,
            game_duration_ms: game_duration.as_millis() as u64,
            bytes_sent,
            bytes_received,
        }
    }
}

/// Criteria for selecting stored records. Empty filter matches all.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Match only this team's games.
    pub team_name: Option<String>,
    /// Match only games of at least this many rounds.
    pub min_rounds: Option<u8>,
}

impl RecordFilter {
    /// Returns `true` if `record` satisfies every set criterion.
    pub fn matches(&self, record: &GameRecord) -> bool {
        if let Some(team) = &self.team_name {
            if record.team_name != *team {
                return false;
            }
        }
        if let Some(min) = self.min_rounds {
            if record.rounds_requested < min {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(team: &str, rounds: u8) -> GameRecord {
        GameRecord {
            team_name: team.into(),
            rounds_requested: rounds,
            player_wins: 0,
            dealer_wins: 0,
            ties: 0,
            rounds: Vec::new(),
            decisions: 0,
            total_decision_time_ms: 0,
            game_duration_ms: 0,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("a", 1)));
        assert!(filter.matches(&record("b", 255)));
    }

    #[test]
    fn test_team_filter() {
        let filter = RecordFilter {
            team_name: Some("alpha".into()),
            ..RecordFilter::default()
        };
        assert!(filter.matches(&record("alpha", 1)));
        assert!(!filter.matches(&record("beta", 1)));
    }

    #[test]
    fn test_min_rounds_filter() {
        let filter = RecordFilter {
            min_rounds: Some(3),
            ..RecordFilter::default()
        };
        assert!(!filter.matches(&record("a", 2)));
        assert!(filter.matches(&record("a", 3)));
        assert!(filter.matches(&record("a", 4)));
    }

    #[test]
    fn test_record_json_round_trip() {
        let rec = record("round-trippers", 5);
        let json = serde_json::to_string(&rec).unwrap();
        let back: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
