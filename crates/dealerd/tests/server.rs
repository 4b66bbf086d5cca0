//! Integration tests for the dealerd server: discovery, the full game
//! flow over real sockets, error handling, and record persistence.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use dealerd::prelude::*;
use dealerd_protocol::{HEADER_LEN, MAGIC_COOKIE, decode, encode, payload_len};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port with a shared in-memory store.
/// Offers go to loopback on a far-off interval so they stay out of the
/// way unless a test asks for them.
async fn start_server() -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let server = DealerdServer::builder()
        .bind("127.0.0.1:0")
        .server_name("test server")
        .broadcast_addr(Ipv4Addr::LOCALHOST)
        .broadcast_interval(Duration::from_secs(3600))
        .build(Arc::clone(&store))
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, store)
}

async fn connect(addr: &str) -> TcpStream {
    TcpStream::connect(addr).await.expect("should connect")
}

async fn send(stream: &mut TcpStream, msg: &Message) {
    stream.write_all(&encode(msg)).await.expect("send");
}

async fn recv(stream: &mut TcpStream) -> Message {
    let mut frame = vec![0u8; HEADER_LEN];
    stream
        .read_exact(&mut frame)
        .await
        .expect("read header");
    let len = payload_len(frame[4]).expect("known message type");
    frame.resize(HEADER_LEN + len, 0);
    stream
        .read_exact(&mut frame[HEADER_LEN..])
        .await
        .expect("read payload");
    decode(&frame).expect("decode")
}

/// Sends a game request and returns the first round's deal.
async fn request_game(
    stream: &mut TcpStream,
    team: &str,
    rounds: u8,
) -> ([Card; 2], Card) {
    send(
        stream,
        &Message::GameRequest {
            rounds,
            team_name: team.into(),
        },
    )
    .await;
    match recv(stream).await {
        Message::GameStartAck { accepted: true } => {}
        other => panic!("expected accepted ack, got {other:?}"),
    }
    expect_deal(stream).await
}

async fn expect_deal(stream: &mut TcpStream) -> ([Card; 2], Card) {
    match recv(stream).await {
        Message::RoundDeal { player, dealer_up } => (player, dealer_up),
        other => panic!("expected RoundDeal, got {other:?}"),
    }
}

/// Stands, drains the dealer's reveal, and returns the round result.
async fn stand_and_finish(
    stream: &mut TcpStream,
) -> (Outcome, u8, u8) {
    send(stream, &Message::PlayerDecision(Decision::Stand)).await;
    loop {
        match recv(stream).await {
            Message::CardDeal(_) => {}
            Message::RoundResult {
                outcome,
                player_value,
                dealer_value,
            } => return (outcome, player_value, dealer_value),
            other => panic!("expected CardDeal or RoundResult, got {other:?}"),
        }
    }
}

/// Plays a whole game with a hit-below-17 strategy and returns the
/// final tallies from GameOver.
async fn play_game(
    stream: &mut TcpStream,
    team: &str,
    rounds: u8,
) -> (u8, u8, u8) {
    let (player, _up) = request_game(stream, team, rounds).await;

    for round in 0..rounds {
        let mut hand = Hand::new();
        if round == 0 {
            hand.push(player[0]);
            hand.push(player[1]);
        } else {
            let (player, _up) = expect_deal(stream).await;
            hand.push(player[0]);
            hand.push(player[1]);
        }

        // Hit until 17, like the dealer does.
        while hand.value() < 17 {
            send(stream, &Message::PlayerDecision(Decision::Hit)).await;
            match recv(stream).await {
                Message::CardDeal(card) => hand.push(card),
                other => panic!("expected CardDeal, got {other:?}"),
            }
        }

        if hand.is_bust() {
            // The server resolves a busted round on its own.
            match recv(stream).await {
                Message::RoundResult { outcome, .. } => {
                    assert_eq!(outcome, Outcome::PlayerBust);
                }
                other => panic!("expected RoundResult, got {other:?}"),
            }
        } else {
            let (_, player_value, _) = stand_and_finish(stream).await;
            assert_eq!(player_value, hand.value());
        }
    }

    match recv(stream).await {
        Message::GameOver {
            player_wins,
            dealer_wins,
            ties,
        } => (player_wins, dealer_wins, ties),
        other => panic!("expected GameOver, got {other:?}"),
    }
}

/// Polls the store until `expected` records have landed. Persistence
/// happens after GameOver is sent, so there is a small race to absorb.
async fn wait_for_records(store: &MemoryStore, expected: usize) {
    for _ in 0..100 {
        if store.len().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("store never reached {expected} records");
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_single_round_stand_is_consistent() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    let (player, _up) = request_game(&mut stream, "Rustaceans", 1).await;
    let mut hand = Hand::new();
    hand.push(player[0]);
    hand.push(player[1]);

    let (outcome, player_value, dealer_value) =
        stand_and_finish(&mut stream).await;
    assert_eq!(player_value, hand.value());

    // The reported outcome must agree with the reported values.
    match outcome {
        Outcome::PlayerBust => panic!("cannot bust without hitting"),
        Outcome::DealerBust => assert!(dealer_value > 21),
        Outcome::PlayerWin => assert!(player_value > dealer_value),
        Outcome::DealerWin => assert!(dealer_value > player_value),
        Outcome::Tie => assert_eq!(player_value, dealer_value),
    }
    if outcome != Outcome::DealerBust {
        // Dealer keeps drawing below 17 and never stands above 21.
        assert!((17..=21).contains(&dealer_value));
    }

    match recv(&mut stream).await {
        Message::GameOver {
            player_wins,
            dealer_wins,
            ties,
        } => assert_eq!(player_wins + dealer_wins + ties, 1),
        other => panic!("expected GameOver, got {other:?}"),
    }
}

#[tokio::test]
async fn test_multi_round_game_tallies_add_up() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    let (wins, losses, ties) = play_game(&mut stream, "Rustaceans", 5).await;
    assert_eq!(wins + losses + ties, 5);
}

#[tokio::test]
async fn test_server_closes_after_game_over() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    play_game(&mut stream, "Rustaceans", 1).await;

    let mut buf = [0u8; 1];
    let n = tokio::time::timeout(
        Duration::from_secs(2),
        stream.read(&mut buf),
    )
    .await
    .expect("server should close")
    .expect("clean close");
    assert_eq!(n, 0);
}

// =========================================================================
// Error handling
// =========================================================================

#[tokio::test]
async fn test_zero_rounds_rejected_then_retry_works() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    send(
        &mut stream,
        &Message::GameRequest {
            rounds: 0,
            team_name: "Rustaceans".into(),
        },
    )
    .await;
    match recv(&mut stream).await {
        Message::GameStartAck { accepted: false } => {}
        other => panic!("expected rejected ack, got {other:?}"),
    }

    // The session survives a rejected request.
    request_game(&mut stream, "Rustaceans", 1).await;
}

#[tokio::test]
async fn test_decision_before_request_is_invalid_state() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    send(&mut stream, &Message::PlayerDecision(Decision::Hit)).await;
    match recv(&mut stream).await {
        Message::GameError(code) => {
            assert_eq!(code, GameErrorCode::InvalidState);
        }
        other => panic!("expected GameError, got {other:?}"),
    }

    // Still usable afterwards.
    request_game(&mut stream, "Rustaceans", 1).await;
}

#[tokio::test]
async fn test_second_request_mid_game_is_invalid_state() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    request_game(&mut stream, "Rustaceans", 1).await;
    send(
        &mut stream,
        &Message::GameRequest {
            rounds: 2,
            team_name: "Rustaceans".into(),
        },
    )
    .await;
    match recv(&mut stream).await {
        Message::GameError(code) => {
            assert_eq!(code, GameErrorCode::InvalidState);
        }
        other => panic!("expected GameError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_bound_message_rejected_session_survives() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    // A well-formed message that only ever flows server-to-client.
    send(
        &mut stream,
        &Message::GameOver {
            player_wins: 1,
            dealer_wins: 0,
            ties: 0,
        },
    )
    .await;
    match recv(&mut stream).await {
        Message::GameError(code) => {
            assert_eq!(code, GameErrorCode::InvalidState);
        }
        other => panic!("expected GameError, got {other:?}"),
    }

    request_game(&mut stream, "Rustaceans", 1).await;
}

#[tokio::test]
async fn test_bad_magic_closes_connection() {
    let (addr, _store) = start_server().await;
    let mut stream = connect(&addr).await;

    let mut frame = 0xDEAD_BEEFu32.to_be_bytes().to_vec();
    frame.push(0x03);
    stream.write_all(&frame).await.expect("send");

    let mut buf = [0u8; 16];
    let n = tokio::time::timeout(
        Duration::from_secs(2),
        stream.read(&mut buf),
    )
    .await
    .expect("server should close")
    .unwrap_or(0);
    assert_eq!(n, 0, "no reply expected after a framing error");
}

#[tokio::test]
async fn test_framing_error_leaves_other_sessions_running() {
    let (addr, _store) = start_server().await;

    let mut good = connect(&addr).await;
    let mut bad = connect(&addr).await;

    request_game(&mut good, "Rustaceans", 1).await;

    // Corrupt the second connection mid-stream.
    let mut frame = MAGIC_COOKIE.to_be_bytes().to_vec();
    frame.push(0x7F); // unknown type
    bad.write_all(&frame).await.expect("send");

    // The first session finishes its round untouched.
    stand_and_finish(&mut good).await;
    match recv(&mut good).await {
        Message::GameOver { .. } => {}
        other => panic!("expected GameOver, got {other:?}"),
    }
}

// =========================================================================
// Persistence
// =========================================================================

#[tokio::test]
async fn test_completed_game_is_persisted() {
    let (addr, store) = start_server().await;
    let mut stream = connect(&addr).await;

    play_game(&mut stream, "Rustaceans", 3).await;
    wait_for_records(&store, 1).await;

    let records = store
        .query(&RecordFilter::default())
        .await
        .expect("query");
    let record = &records[0];
    assert_eq!(record.team_name, "Rustaceans");
    assert_eq!(record.rounds_requested, 3);
    assert_eq!(record.rounds.len(), 3);
    assert_eq!(
        record.player_wins + record.dealer_wins + record.ties,
        3
    );
    assert!(record.bytes_sent > 0);
    assert!(record.bytes_received > 0);
}

#[tokio::test]
async fn test_abandoned_game_is_not_persisted() {
    let (addr, store) = start_server().await;
    let mut stream = connect(&addr).await;

    request_game(&mut stream, "Quitters", 1).await;
    drop(stream);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_games_are_isolated() {
    let (addr, store) = start_server().await;

    let addr2 = addr.clone();
    let game1 = tokio::spawn(async move {
        let mut stream = connect(&addr).await;
        play_game(&mut stream, "Team One", 2).await
    });
    let game2 = tokio::spawn(async move {
        let mut stream = connect(&addr2).await;
        play_game(&mut stream, "Team Two", 4).await
    });

    let (w1, l1, t1) = game1.await.expect("game one");
    let (w2, l2, t2) = game2.await.expect("game two");
    assert_eq!(w1 + l1 + t1, 2);
    assert_eq!(w2 + l2 + t2, 4);

    wait_for_records(&store, 2).await;
    let mut teams: Vec<String> = store
        .query(&RecordFilter::default())
        .await
        .expect("query")
        .into_iter()
        .map(|r| r.team_name)
        .collect();
    teams.sort();
    assert_eq!(teams, ["Team One", "Team Two"]);
}

// =========================================================================
// Discovery
// =========================================================================

#[tokio::test]
async fn test_offers_reach_discovery_port() {
    let listener = tokio::net::UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("bind discovery socket");
    let udp_port = listener.local_addr().expect("local addr").port();

    let server = DealerdServer::builder()
        .bind("127.0.0.1:0")
        .server_name("Neon Casino")
        .broadcast_addr(Ipv4Addr::LOCALHOST)
        .broadcast_port(udp_port)
        .broadcast_interval(Duration::from_millis(50))
        .build(MemoryStore::new())
        .await
        .expect("server should build");
    let tcp_port = server.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    let mut buf = [0u8; 64];
    let (n, _) = tokio::time::timeout(
        Duration::from_secs(2),
        listener.recv_from(&mut buf),
    )
    .await
    .expect("offer should arrive")
    .expect("recv");

    match decode(&buf[..n]).expect("decode offer") {
        Message::Offer {
            tcp_port: offered,
            server_name,
        } => {
            assert_eq!(offered, tcp_port);
            assert_eq!(server_name, "Neon Casino");
        }
        other => panic!("expected Offer, got {other:?}"),
    }
}
