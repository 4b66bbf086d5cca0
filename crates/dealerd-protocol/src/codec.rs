//! The fixed-layout binary codec.
//!
//! Every frame is `[4B magic][1B type tag][payload]` with the payload
//! size fixed per tag. Integers are big-endian. Name fields occupy
//! exactly [`NAME_LEN`] bytes, null-padded on encode and trimmed of
//! trailing NULs on decode. A card occupies 2 bytes: rank index (0–12)
//! then suit index (0–3).
//!
//! Decoding operates on a single immutable byte buffer and is pure —
//! no sockets, no state. The session handler uses [`payload_len`] to
//! know exactly how many bytes to read after the 5-byte header.

use dealerd_cards::{Card, Rank, Suit};

use crate::{Decision, GameErrorCode, Message, Outcome, ProtocolError};

/// The magic cookie every frame starts with.
pub const MAGIC_COOKIE: u32 = 0xABCD_DCBA;

/// Bytes of magic cookie plus type tag.
pub const HEADER_LEN: usize = 5;

/// Fixed width of string fields (server name, team name).
pub const NAME_LEN: usize = 32;

/// Returns the fixed payload size for a type tag, or `None` for tags
/// the protocol does not define.
pub fn payload_len(tag: u8) -> Option<usize> {
    match tag {
        0x02 => Some(2 + NAME_LEN),  // Offer: port + name
        0x03 => Some(1 + NAME_LEN),  // GameRequest: rounds + name
        0x04 => Some(1),             // GameStartAck: accepted flag
        0x05 => Some(6),             // RoundDeal: 3 cards
        0x06 => Some(1),             // PlayerDecision
        0x07 => Some(2),             // CardDeal: 1 card
        0x08 => Some(3),             // RoundResult: outcome + 2 values
        0x09 => Some(3),             // GameOver: 3 tallies
        0x0A => Some(1),             // GameError
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serializes a message into its wire frame.
pub fn encode(msg: &Message) -> Vec<u8> {
    let payload = payload_len(msg.type_tag()).unwrap_or(0);
    let mut buf = Vec::with_capacity(HEADER_LEN + payload);
    buf.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    buf.push(msg.type_tag());

    match msg {
        Message::Offer {
            tcp_port,
            server_name,
        } => {
            buf.extend_from_slice(&tcp_port.to_be_bytes());
            push_name(&mut buf, server_name);
        }
        Message::GameRequest { rounds, team_name } => {
            buf.push(*rounds);
            push_name(&mut buf, team_name);
        }
        Message::GameStartAck { accepted } => {
            buf.push(u8::from(*accepted));
        }
        Message::RoundDeal { player, dealer_up } => {
            push_card(&mut buf, player[0]);
            push_card(&mut buf, player[1]);
            push_card(&mut buf, *dealer_up);
        }
        Message::PlayerDecision(decision) => {
            buf.push(decision.to_wire());
        }
        Message::CardDeal(card) => {
            push_card(&mut buf, *card);
        }
        Message::RoundResult {
            outcome,
            player_value,
            dealer_value,
        } => {
            buf.push(outcome.to_wire());
            buf.push(*player_value);
            buf.push(*dealer_value);
        }
        Message::GameOver {
            player_wins,
            dealer_wins,
            ties,
        } => {
            buf.push(*player_wins);
            buf.push(*dealer_wins);
            buf.push(*ties);
        }
        Message::GameError(code) => {
            buf.push(code.to_wire());
        }
    }

    buf
}

/// Null-pads (or truncates) a name into its fixed-width field.
fn push_name(buf: &mut Vec<u8>, name: &str) {
    let bytes = name.as_bytes();
    let take = bytes.len().min(NAME_LEN);
    buf.extend_from_slice(&bytes[..take]);
    buf.resize(buf.len() + (NAME_LEN - take), 0);
}

fn push_card(buf: &mut Vec<u8>, card: Card) {
    buf.push(card.rank.index());
    buf.push(card.suit.index());
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Deserializes one wire frame into a [`Message`].
///
/// # Errors
///
/// - [`ProtocolError::Truncated`] — fewer bytes than the header, or than
///   the tag's fixed payload, demand.
/// - [`ProtocolError::BadMagic`] — the cookie mismatches.
/// - [`ProtocolError::UnknownType`] — unrecognized type tag.
/// - [`ProtocolError::InvalidPayload`] — a field held an out-of-range
///   value.
pub fn decode(buf: &[u8]) -> Result<Message, ProtocolError> {
    if buf.len() < HEADER_LEN {
        return Err(ProtocolError::Truncated {
            needed: HEADER_LEN,
            have: buf.len(),
        });
    }

    let magic = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if magic != MAGIC_COOKIE {
        return Err(ProtocolError::BadMagic(magic));
    }

    let tag = buf[4];
    let payload_size =
        payload_len(tag).ok_or(ProtocolError::UnknownType(tag))?;
    let needed = HEADER_LEN + payload_size;
    if buf.len() < needed {
        return Err(ProtocolError::Truncated {
            needed,
            have: buf.len(),
        });
    }
    let payload = &buf[HEADER_LEN..needed];

    match tag {
        0x02 => Ok(Message::Offer {
            tcp_port: u16::from_be_bytes([payload[0], payload[1]]),
            server_name: read_name(&payload[2..2 + NAME_LEN]),
        }),
        0x03 => Ok(Message::GameRequest {
            rounds: payload[0],
            team_name: read_name(&payload[1..1 + NAME_LEN]),
        }),
        0x04 => Ok(Message::GameStartAck {
            accepted: payload[0] != 0,
        }),
        0x05 => Ok(Message::RoundDeal {
            player: [
                read_card(payload[0], payload[1])?,
                read_card(payload[2], payload[3])?,
            ],
            dealer_up: read_card(payload[4], payload[5])?,
        }),
        0x06 => {
            let decision = Decision::from_wire(payload[0]).ok_or_else(|| {
                ProtocolError::InvalidPayload(format!(
                    "unknown decision byte {:#04x}",
                    payload[0]
                ))
            })?;
            Ok(Message::PlayerDecision(decision))
        }
        0x07 => Ok(Message::CardDeal(read_card(payload[0], payload[1])?)),
        0x08 => {
            let outcome = Outcome::from_wire(payload[0]).ok_or_else(|| {
                ProtocolError::InvalidPayload(format!(
                    "unknown outcome byte {:#04x}",
                    payload[0]
                ))
            })?;
            Ok(Message::RoundResult {
                outcome,
                player_value: payload[1],
                dealer_value: payload[2],
            })
        }
        0x09 => Ok(Message::GameOver {
            player_wins: payload[0],
            dealer_wins: payload[1],
            ties: payload[2],
        }),
        0x0A => {
            let code = GameErrorCode::from_wire(payload[0]).ok_or_else(|| {
                ProtocolError::InvalidPayload(format!(
                    "unknown game error byte {:#04x}",
                    payload[0]
                ))
            })?;
            Ok(Message::GameError(code))
        }
        // payload_len already rejected every other tag.
        _ => unreachable!("tag {tag:#04x} passed payload_len"),
    }
}

/// Decodes a fixed-width name field, trimming trailing NUL padding.
fn read_name(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn read_card(rank_idx: u8, suit_idx: u8) -> Result<Card, ProtocolError> {
    let rank = Rank::from_index(rank_idx).ok_or_else(|| {
        ProtocolError::InvalidPayload(format!("rank index {rank_idx} out of range"))
    })?;
    let suit = Suit::from_index(suit_idx).ok_or_else(|| {
        ProtocolError::InvalidPayload(format!("suit index {suit_idx} out of range"))
    })?;
    Ok(Card::new(rank, suit))
}
