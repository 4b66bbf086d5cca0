//! Per-connection session handler.
//!
//! Each accepted connection gets its own Tokio task running one
//! [`SessionHandler`]. The handler owns the connection and the game
//! session outright — nothing about a session is visible to any other
//! task, which is what makes cross-client interference impossible.
//!
//! Error discipline, per layer:
//! - protocol errors: log, send nothing further, close — a client that
//!   broke framing cannot be resynchronized;
//! - game errors: reply with a `GameError` packet, keep the session;
//! - storage errors: log and move on, the finished game stands.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use dealerd_engine::{GameError, GamePhase, GameSession};
use dealerd_protocol::{Decision, Message};
use dealerd_storage::{GameRecord, GameStore};
use tokio::net::TcpStream;

use crate::ServerError;
use crate::conn::FramedConn;
use crate::server::ServerState;

/// Handles a single client connection from accept to close.
pub(crate) async fn handle_connection<S: GameStore>(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState<S>>,
) -> Result<(), ServerError> {
    state.active.fetch_add(1, Ordering::Relaxed);
    let result = SessionHandler {
        conn: FramedConn::new(stream),
        session: GameSession::new(rand::random::<u64>()),
        addr,
        started: Instant::now(),
        turn_started: None,
    }
    .run(&state)
    .await;
    let remaining = state.active.fetch_sub(1, Ordering::Relaxed) - 1;
    tracing::info!(%addr, active = remaining, "client disconnected");
    result
}

struct SessionHandler {
    conn: FramedConn,
    session: GameSession,
    addr: SocketAddr,
    /// When the connection was accepted; the whole-game timer.
    started: Instant,
    /// When the turn was last handed to the player, for decision
    /// latency measurement. `None` while no decision is expected.
    turn_started: Option<Instant>,
}

impl SessionHandler {
    async fn run<S: GameStore>(
        mut self,
        state: &ServerState<S>,
    ) -> Result<(), ServerError> {
        tracing::info!(addr = %self.addr, "client connected");

        loop {
            let msg = match self.conn.read_message().await {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    tracing::info!(addr = %self.addr, "connection closed by client");
                    return Ok(());
                }
                Err(ServerError::Protocol(e)) => {
                    // Framing is broken; anything further we sent could
                    // land mid-garbage. Close without replying.
                    tracing::warn!(
                        addr = %self.addr,
                        error = %e,
                        "protocol error, closing connection"
                    );
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::debug!(addr = %self.addr, error = %e, "read failed");
                    return Err(e);
                }
            };

            if self.dispatch(msg, state).await? {
                return Ok(());
            }
        }
    }

    /// Routes one decoded message. Returns `true` when the game is
    /// complete and the connection should close.
    async fn dispatch<S: GameStore>(
        &mut self,
        msg: Message,
        state: &ServerState<S>,
    ) -> Result<bool, ServerError> {
        let tag = msg.type_tag();
        match msg {
            Message::GameRequest { rounds, team_name } => {
                self.on_game_request(rounds, &team_name).await?;
                Ok(false)
            }
            Message::PlayerDecision(decision) => {
                self.on_decision(decision, state).await
            }
            // Server-to-client messages arriving at the server are
            // well-framed but never valid here. Reject each and keep
            // the session: framing is intact, the client can recover.
            Message::Offer { .. }
            | Message::GameStartAck { .. }
            | Message::RoundDeal { .. }
            | Message::CardDeal(_)
            | Message::RoundResult { .. }
            | Message::GameOver { .. }
            | Message::GameError(_) => {
                tracing::debug!(
                    addr = %self.addr,
                    tag,
                    "unexpected message direction"
                );
                self.send_game_error(&GameError::InvalidState {
                    operation: "handle that message",
                    phase: "server side",
                })
                .await?;
                Ok(false)
            }
        }
    }

    async fn on_game_request(
        &mut self,
        rounds: u8,
        team_name: &str,
    ) -> Result<(), ServerError> {
        match self.session.start_game(team_name, rounds) {
            Ok(()) => {
                tracing::info!(
                    addr = %self.addr,
                    team = team_name,
                    rounds,
                    "game started"
                );
                self.conn
                    .send(&Message::GameStartAck { accepted: true })
                    .await?;
                self.deal_and_send().await
            }
            Err(GameError::InvalidRounds(n)) => {
                // The original server re-prompts on a bad round count;
                // a rejected ack leaves the client free to retry.
                tracing::warn!(
                    addr = %self.addr,
                    rounds = n,
                    "rejected game request"
                );
                self.conn
                    .send(&Message::GameStartAck { accepted: false })
                    .await
            }
            Err(e) => self.send_game_error(&e).await,
        }
    }

    async fn on_decision<S: GameStore>(
        &mut self,
        decision: Decision,
        state: &ServerState<S>,
    ) -> Result<bool, ServerError> {
        if let Some(turn_started) = self.turn_started.take() {
            self.session
                .stats_mut()
                .record_decision(turn_started.elapsed());
        }
        tracing::info!(addr = %self.addr, %decision, "player decision");

        match decision {
            Decision::Hit => match self.session.player_hit() {
                Ok(hit) => {
                    self.conn.send(&Message::CardDeal(hit.card)).await?;
                    tracing::info!(
                        addr = %self.addr,
                        card = %hit.card,
                        value = hit.hand_value,
                        "dealt card to player"
                    );
                    if hit.busted {
                        tracing::info!(addr = %self.addr, "player busted");
                        self.finish_round(state).await
                    } else {
                        self.turn_started = Some(Instant::now());
                        Ok(false)
                    }
                }
                Err(e) => {
                    self.send_game_error(&e).await?;
                    Ok(false)
                }
            },
            Decision::Stand => match self.session.player_stand() {
                Ok(play) => {
                    // Reveal the hole card first, then each draw.
                    self.conn.send(&Message::CardDeal(play.hole)).await?;
                    for card in &play.drawn {
                        self.conn.send(&Message::CardDeal(*card)).await?;
                    }
                    tracing::info!(
                        addr = %self.addr,
                        drew = play.drawn.len(),
                        value = play.final_value,
                        busted = play.busted,
                        "dealer turn finished"
                    );
                    self.finish_round(state).await
                }
                Err(e) => {
                    self.send_game_error(&e).await?;
                    Ok(false)
                }
            },
        }
    }

    /// Deals a fresh round and sends the initial cards. The hole card
    /// stays server-side.
    async fn deal_and_send(&mut self) -> Result<(), ServerError> {
        let deal = match self.session.deal_initial() {
            Ok(deal) => deal,
            Err(e) => return self.send_game_error(&e).await,
        };
        tracing::info!(
            addr = %self.addr,
            round = self.session.round_index() + 1,
            player = %self.session.player_hand(),
            dealer_up = %deal.dealer_up,
            dealer_hole = %deal.dealer_hole,
            "round dealt"
        );
        self.conn
            .send(&Message::RoundDeal {
                player: deal.player,
                dealer_up: deal.dealer_up,
            })
            .await?;
        self.turn_started = Some(Instant::now());
        Ok(())
    }

    /// Takes the round result, reports it, and either opens the next
    /// round or completes the game. Returns `true` on completion.
    async fn finish_round<S: GameStore>(
        &mut self,
        state: &ServerState<S>,
    ) -> Result<bool, ServerError> {
        let result = self.session.resolve_round()?;
        tracing::info!(
            addr = %self.addr,
            round = result.round + 1,
            outcome = %result.outcome,
            player = result.player_value,
            dealer = result.dealer_value,
            "round complete"
        );
        self.conn
            .send(&Message::RoundResult {
                outcome: result.outcome,
                player_value: result.player_value,
                dealer_value: result.dealer_value,
            })
            .await?;

        if self.session.phase() == GamePhase::GameComplete {
            let stats = self.session.stats();
            self.conn
                .send(&Message::GameOver {
                    player_wins: stats.player_wins,
                    dealer_wins: stats.dealer_wins,
                    ties: stats.ties,
                })
                .await?;
            self.flush_record(state).await;
            tracing::info!(
                addr = %self.addr,
                team = self.session.team_name(),
                "game complete"
            );
            Ok(true)
        } else {
            self.deal_and_send().await?;
            Ok(false)
        }
    }

    /// Hands the finalized game record to storage. Best-effort: a
    /// failed write is logged and the session still closes normally.
    async fn flush_record<S: GameStore>(&mut self, state: &ServerState<S>) {
        let record = GameRecord::from_stats(
            self.session.team_name().to_string(),
            self.session.rounds_requested(),
            self.session.stats().clone(),
            self.started.elapsed(),
            self.conn.bytes_sent(),
            self.conn.bytes_received(),
        );
        if let Err(e) = state.store.append(&record).await {
            tracing::error!(
                addr = %self.addr,
                error = %e,
                "failed to persist game record"
            );
        }
    }

    /// Reports a recoverable game error to the client.
    async fn send_game_error(
        &mut self,
        err: &GameError,
    ) -> Result<(), ServerError> {
        tracing::warn!(addr = %self.addr, error = %err, "game error");
        self.conn
            .send(&Message::GameError(err.wire_code()))
            .await
    }
}
