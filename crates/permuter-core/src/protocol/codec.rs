//! Binary codec for encoding and decoding permuter bridge messages.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][reserved:2][payload_len:4][request_id:8][payload:N]
//! ```
//! Total header size: 16 bytes. All multi-byte integers are big-endian.
//! Strings are UTF-8 with a 4-byte length prefix.
//!
//! Payload layouts:
//! ```text
//! Ping / Pong       [token:8]
//! PermuteRequest    [rule_count:4]{[len:4][utf8]}*[part_count:i32][order_count:i32]
//! PermuteResponse   [row_count:4][row_width:4]{[len:4][utf8]}*(row_count*row_width)
//! Error             [code:1][len:4][utf8]
//! ```

use crate::protocol::messages::{
    BridgeMessage, ErrorCode, ErrorMessage, MessageType, PermuteRequestMessage,
    PermuteResponseMessage, HEADER_SIZE, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION,
};
use thiserror::Error;

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice does not yet hold a complete frame.
    ///
    /// Streaming readers treat this as "read more bytes", not as a failure.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The message type byte in the header is not a recognized value.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The payload could not be parsed (truncated field, bad UTF-8, trailing bytes, ...).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The payload is larger than [`MAX_PAYLOAD_SIZE`].
    #[error("payload of {size} bytes exceeds maximum {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// A response matrix had rows of different widths.
    #[error("response rows must all have width {expected}, row {row} has {actual}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// One decoded frame: the message plus the request id from its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub request_id: u64,
    pub message: BridgeMessage,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`BridgeMessage`] into a byte vector including the 16-byte header.
///
/// # Errors
///
/// Returns [`ProtocolError::RaggedMatrix`] for a non-rectangular response and
/// [`ProtocolError::PayloadTooLarge`] if the payload would exceed
/// [`MAX_PAYLOAD_SIZE`].
///
/// # Examples
///
/// ```rust
/// use permuter_core::protocol::{encode_message, decode_message};
/// use permuter_core::protocol::messages::BridgeMessage;
///
/// let msg = BridgeMessage::Ping(42);
/// let bytes = encode_message(&msg, 7).unwrap();
/// let (frame, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(frame.message, msg);
/// assert_eq!(frame.request_id, 7);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg: &BridgeMessage, request_id: u64) -> Result<Vec<u8>, ProtocolError> {
    let payload = encode_payload(msg)?;
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let payload_len = payload.len() as u32;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());

    // Header: version (1) + msg_type (1) + reserved (2) + payload_len (4) +
    //         request_id (8) = 16 bytes
    buf.push(PROTOCOL_VERSION);
    buf.push(msg.message_type() as u8);
    buf.push(0x00); // reserved
    buf.push(0x00); // reserved
    buf.extend_from_slice(&payload_len.to_be_bytes());
    buf.extend_from_slice(&request_id.to_be_bytes());

    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decodes one [`Frame`] from the beginning of `bytes`.
///
/// Returns the frame and the total number of bytes consumed (header +
/// payload), so the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] when `bytes` holds only part of
/// a frame, and other [`ProtocolError`] variants when the bytes are malformed.
pub fn decode_message(bytes: &[u8]) -> Result<(Frame, usize), ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let msg_type_byte = bytes[1];
    let msg_type = MessageType::try_from(msg_type_byte)
        .map_err(|_| ProtocolError::UnknownMessageType(msg_type_byte))?;

    // bytes[2..4] are reserved – ignored on decode

    let payload_len = read_u32(bytes, 4)? as usize;
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let request_id = read_u64(bytes, 8)?;

    let total_needed = HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::InsufficientData {
            needed: total_needed,
            available: bytes.len(),
        });
    }

    let payload = &bytes[HEADER_SIZE..total_needed];
    let message = decode_payload(msg_type, payload)?;
    Ok((
        Frame {
            request_id,
            message,
        },
        total_needed,
    ))
}

/// Reads the request id from a frame header without validating the rest.
///
/// Lets a receiver address an `Error` reply to a request it could not decode.
/// Returns `None` if fewer than [`HEADER_SIZE`] bytes are available.
pub fn peek_request_id(bytes: &[u8]) -> Option<u64> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }
    read_u64(bytes, 8).ok()
}

// ── Payload encoding ──────────────────────────────────────────────────────────

fn encode_payload(msg: &BridgeMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::new();
    match msg {
        BridgeMessage::Ping(token) => buf.extend_from_slice(&token.to_be_bytes()),
        BridgeMessage::Pong(token) => buf.extend_from_slice(&token.to_be_bytes()),
        BridgeMessage::PermuteRequest(m) => encode_permute_request(&mut buf, m),
        BridgeMessage::PermuteResponse(m) => encode_permute_response(&mut buf, m)?,
        BridgeMessage::Error(m) => encode_error(&mut buf, m),
    }
    Ok(buf)
}

fn encode_permute_request(buf: &mut Vec<u8>, m: &PermuteRequestMessage) {
    buf.extend_from_slice(&(m.rules.len() as u32).to_be_bytes());
    for rule in &m.rules {
        write_length_prefixed_string(buf, rule);
    }
    buf.extend_from_slice(&m.part_count.to_be_bytes());
    buf.extend_from_slice(&m.order_count.to_be_bytes());
}

fn encode_permute_response(
    buf: &mut Vec<u8>,
    m: &PermuteResponseMessage,
) -> Result<(), ProtocolError> {
    let width = m.rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 && !m.rows.is_empty() {
        return Err(ProtocolError::MalformedPayload(format!(
            "{} response rows have no parts",
            m.rows.len()
        )));
    }
    if let Some((row, actual)) = m
        .rows
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, len)| *len != width)
    {
        return Err(ProtocolError::RaggedMatrix {
            row,
            expected: width,
            actual,
        });
    }

    buf.extend_from_slice(&(m.rows.len() as u32).to_be_bytes());
    buf.extend_from_slice(&(width as u32).to_be_bytes());
    for name in m.rows.iter().flatten() {
        write_length_prefixed_string(buf, name);
    }
    Ok(())
}

fn encode_error(buf: &mut Vec<u8>, m: &ErrorMessage) {
    buf.push(m.code as u8);
    write_length_prefixed_string(buf, &m.description);
}

// ── Payload decoding ──────────────────────────────────────────────────────────

fn decode_payload(msg_type: MessageType, payload: &[u8]) -> Result<BridgeMessage, ProtocolError> {
    let (msg, consumed) = match msg_type {
        MessageType::Ping => (BridgeMessage::Ping(read_token(payload)?), 8),
        MessageType::Pong => (BridgeMessage::Pong(read_token(payload)?), 8),
        MessageType::PermuteRequest => {
            let (m, end) = decode_permute_request(payload)?;
            (BridgeMessage::PermuteRequest(m), end)
        }
        MessageType::PermuteResponse => {
            let (m, end) = decode_permute_response(payload)?;
            (BridgeMessage::PermuteResponse(m), end)
        }
        MessageType::Error => {
            let (m, end) = decode_error(payload)?;
            (BridgeMessage::Error(m), end)
        }
    };

    if consumed != payload.len() {
        return Err(ProtocolError::MalformedPayload(format!(
            "{:?}: {} trailing bytes",
            msg_type,
            payload.len() - consumed
        )));
    }
    Ok(msg)
}

fn read_token(p: &[u8]) -> Result<u64, ProtocolError> {
    require_len(p, 8, "token")?;
    read_u64(p, 0)
}

fn decode_permute_request(p: &[u8]) -> Result<(PermuteRequestMessage, usize), ProtocolError> {
    // 4 (rule_count) + rules + 4 (part_count) + 4 (order_count) >= 12
    require_len(p, 12, "PermuteRequest")?;
    let rule_count = read_u32(p, 0)? as usize;

    // Every rule needs at least its 4-byte length prefix; cap the
    // pre-allocation by what the payload could actually hold.
    let mut rules = Vec::with_capacity(rule_count.min(p.len() / 4));
    let mut off = 4;
    for _ in 0..rule_count {
        let (rule, next) = read_length_prefixed_string(p, off)?;
        rules.push(rule);
        off = next;
    }

    require_len(p, off + 8, "PermuteRequest.counts")?;
    let part_count = read_i32(p, off)?;
    let order_count = read_i32(p, off + 4)?;
    Ok((
        PermuteRequestMessage {
            rules,
            part_count,
            order_count,
        },
        off + 8,
    ))
}

fn decode_permute_response(p: &[u8]) -> Result<(PermuteResponseMessage, usize), ProtocolError> {
    require_len(p, 8, "PermuteResponse")?;
    let row_count = read_u32(p, 0)? as usize;
    let width = read_u32(p, 4)? as usize;

    // Rows are never empty; a zero width would let row_count escape the
    // cell bound below.
    if width == 0 && row_count > 0 {
        return Err(ProtocolError::MalformedPayload(format!(
            "{row_count} response rows declared with width 0"
        )));
    }
    let cells = row_count.checked_mul(width).ok_or_else(|| {
        ProtocolError::MalformedPayload(format!("{row_count}x{width} matrix overflows"))
    })?;
    // Each cell carries at least a 4-byte length prefix.
    if cells > (p.len() - 8) / 4 {
        return Err(ProtocolError::MalformedPayload(format!(
            "{row_count}x{width} matrix does not fit in {} payload bytes",
            p.len()
        )));
    }

    let mut rows = Vec::with_capacity(row_count.min(cells));
    let mut off = 8;
    for _ in 0..row_count {
        let mut row = Vec::with_capacity(width);
        for _ in 0..width {
            let (name, next) = read_length_prefixed_string(p, off)?;
            row.push(name);
            off = next;
        }
        rows.push(row);
    }
    Ok((PermuteResponseMessage { rows }, off))
}

fn decode_error(p: &[u8]) -> Result<(ErrorMessage, usize), ProtocolError> {
    require_len(p, 5, "Error")?;
    let code = ErrorCode::try_from(p[0])
        .map_err(|_| ProtocolError::MalformedPayload(format!("unknown error code: {}", p[0])))?;
    let (description, end) = read_length_prefixed_string(p, 1)?;
    Ok((ErrorMessage { code, description }, end))
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn require_len(buf: &[u8], needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: need {needed} bytes, got {}",
            buf.len()
        )))
    } else {
        Ok(())
    }
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ProtocolError> {
    let bytes = buf
        .get(offset..offset + 4)
        .ok_or(ProtocolError::InsufficientData {
            needed: offset + 4,
            available: buf.len(),
        })?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, ProtocolError> {
    read_u32(buf, offset).map(|v| v as i32)
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    let hi = read_u32(buf, offset)? as u64;
    let lo = read_u32(buf, offset + 4)? as u64;
    Ok((hi << 32) | lo)
}

/// Writes a 4-byte length prefix followed by the UTF-8 string bytes.
fn write_length_prefixed_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Reads a 4-byte length prefix and then that many UTF-8 bytes.
/// Returns the string and the offset of the byte after the string.
fn read_length_prefixed_string(buf: &[u8], offset: usize) -> Result<(String, usize), ProtocolError> {
    if buf.len() < offset + 4 {
        return Err(ProtocolError::MalformedPayload(format!(
            "need 4 bytes for string length at offset {offset}"
        )));
    }
    let len = read_u32(buf, offset)? as usize;
    let start = offset + 4;
    if buf.len() - start < len {
        return Err(ProtocolError::MalformedPayload(format!(
            "string of length {len} at offset {start} exceeds buffer"
        )));
    }
    let s = std::str::from_utf8(&buf[start..start + len])
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok((s, start + len))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(msg: &BridgeMessage) -> BridgeMessage {
        let encoded = encode_message(msg, 0).expect("encode failed");
        let (frame, consumed) = decode_message(&encoded).expect("decode failed");
        assert_eq!(consumed, encoded.len(), "consumed bytes should equal total encoded size");
        frame.message
    }

    fn request(rules: &[&str], part_count: i32, order_count: i32) -> BridgeMessage {
        BridgeMessage::PermuteRequest(PermuteRequestMessage {
            rules: rules.iter().map(|r| r.to_string()).collect(),
            part_count,
            order_count,
        })
    }

    // ── Header ───────────────────────────────────────────────────────────────

    #[test]
    fn test_header_layout() {
        // Arrange
        let msg = BridgeMessage::Ping(1);

        // Act
        let bytes = encode_message(&msg, 0x0102_0304_0506_0708).unwrap();

        // Assert
        assert_eq!(bytes[0], PROTOCOL_VERSION);
        assert_eq!(bytes[1], MessageType::Ping as u8);
        assert_eq!(&bytes[2..4], &[0, 0], "reserved bytes are zero");
        assert_eq!(&bytes[4..8], &8u32.to_be_bytes(), "payload length");
        assert_eq!(&bytes[8..16], &[1, 2, 3, 4, 5, 6, 7, 8], "request id");
        assert_eq!(bytes.len(), HEADER_SIZE + 8);
    }

    #[test]
    fn test_request_id_is_preserved() {
        let bytes = encode_message(&BridgeMessage::Pong(9), u64::MAX).unwrap();
        let (frame, _) = decode_message(&bytes).unwrap();
        assert_eq!(frame.request_id, u64::MAX);
        assert_eq!(peek_request_id(&bytes), Some(u64::MAX));
    }

    #[test]
    fn test_peek_request_id_needs_full_header() {
        let bytes = encode_message(&BridgeMessage::Ping(0), 5).unwrap();
        assert_eq!(peek_request_id(&bytes[..HEADER_SIZE - 1]), None);
    }

    // ── PermuteRequest ───────────────────────────────────────────────────────

    #[test]
    fn test_permute_request_preserves_rule_order() {
        let msg = request(&["STARTSWITH L1", "L2 BEFORE L3", "CONTAINS L1", "ALL_FORWARD"], 3, 100);
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_permute_request_with_empty_rule_set() {
        let msg = request(&[], 1, 1);
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_permute_request_keeps_negative_counts() {
        // -1 is how callers ask the solver for every valid order.
        let msg = request(&["CONTAINS A"], 0, -1);
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_permute_request_with_unicode_and_empty_rule() {
        let msg = request(&["", "Promoter_α BEFORE Terminator_β"], 2, 1);
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_permute_request_rule_count_beyond_payload_is_rejected() {
        // Arrange: claim a million rules but ship none.
        let mut bytes = encode_message(&request(&[], 1, 1), 0).unwrap();
        bytes[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&1_000_000u32.to_be_bytes());

        // Act
        let result = decode_message(&bytes);

        // Assert
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    // ── PermuteResponse ──────────────────────────────────────────────────────

    #[test]
    fn test_permute_response_round_trip() {
        let msg = BridgeMessage::PermuteResponse(PermuteResponseMessage {
            rows: vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["A".to_string(), "C".to_string()],
            ],
        });
        assert_eq!(round_trip(&msg), msg);
    }

    #[test]
    fn test_empty_permute_response_decodes_to_zero_rows() {
        let msg = BridgeMessage::PermuteResponse(PermuteResponseMessage::default());
        match round_trip(&msg) {
            BridgeMessage::PermuteResponse(m) => assert!(m.rows.is_empty()),
            other => panic!("expected PermuteResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_response_is_rejected_on_encode() {
        let msg = BridgeMessage::PermuteResponse(PermuteResponseMessage {
            rows: vec![vec!["A".to_string(), "B".to_string()], vec!["C".to_string()]],
        });
        assert_eq!(
            encode_message(&msg, 0),
            Err(ProtocolError::RaggedMatrix {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_oversized_matrix_dimensions_are_rejected() {
        // Arrange: 2^32-1 x 2^32-1 cells declared in an 8-byte payload.
        let mut bytes =
            encode_message(&BridgeMessage::PermuteResponse(PermuteResponseMessage::default()), 0)
                .unwrap();
        bytes[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        bytes[HEADER_SIZE + 4..HEADER_SIZE + 8].copy_from_slice(&u32::MAX.to_be_bytes());

        // Act / Assert
        assert!(matches!(
            decode_message(&bytes),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_rows_without_width_are_rejected_on_decode() {
        // Arrange: u32::MAX rows of width 0 in an 8-byte payload.
        let mut bytes =
            encode_message(&BridgeMessage::PermuteResponse(PermuteResponseMessage::default()), 1)
                .unwrap();
        bytes[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE + 8);

        // Act
        let result = decode_message(&bytes);

        // Assert
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_rows_without_width_are_rejected_on_encode() {
        let msg = BridgeMessage::PermuteResponse(PermuteResponseMessage {
            rows: vec![Vec::new(), Vec::new()],
        });
        assert!(matches!(
            encode_message(&msg, 0),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    // ── Error ────────────────────────────────────────────────────────────────

    #[test]
    fn test_error_round_trip() {
        let msg = BridgeMessage::Error(ErrorMessage {
            code: ErrorCode::InvalidMessage,
            description: "unknown message type: 0x42".to_string(),
        });
        assert_eq!(round_trip(&msg), msg);
    }

    // ── Decode failures ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_short_header_reports_insufficient_data() {
        assert_eq!(
            decode_message(&[PROTOCOL_VERSION, 0x01, 0x00]),
            Err(ProtocolError::InsufficientData {
                needed: HEADER_SIZE,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_partial_payload_reports_insufficient_data() {
        // Arrange
        let bytes = encode_message(&request(&["CONTAINS A"], 1, 1), 0).unwrap();

        // Act
        let result = decode_message(&bytes[..bytes.len() - 1]);

        // Assert – a streaming reader must be told to wait for more bytes
        assert!(matches!(result, Err(ProtocolError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_wrong_version() {
        let mut bytes = encode_message(&BridgeMessage::Ping(0), 0).unwrap();
        bytes[0] = 0x02;
        assert_eq!(decode_message(&bytes), Err(ProtocolError::UnsupportedVersion(0x02)));
    }

    #[test]
    fn test_decode_unknown_message_type() {
        let mut bytes = encode_message(&BridgeMessage::Ping(0), 0).unwrap();
        bytes[1] = 0x42;
        assert_eq!(decode_message(&bytes), Err(ProtocolError::UnknownMessageType(0x42)));
    }

    #[test]
    fn test_decode_rejects_declared_length_above_limit() {
        let mut bytes = encode_message(&BridgeMessage::Ping(0), 0).unwrap();
        let huge = (MAX_PAYLOAD_SIZE as u32) + 1;
        bytes[4..8].copy_from_slice(&huge.to_be_bytes());
        assert_eq!(
            decode_message(&bytes),
            Err(ProtocolError::PayloadTooLarge {
                size: MAX_PAYLOAD_SIZE + 1,
                max: MAX_PAYLOAD_SIZE
            })
        );
    }

    #[test]
    fn test_decode_rejects_trailing_payload_bytes() {
        // Arrange: a Ping whose header claims 9 payload bytes.
        let mut bytes = encode_message(&BridgeMessage::Ping(0), 0).unwrap();
        bytes.push(0xAA);
        bytes[4..8].copy_from_slice(&9u32.to_be_bytes());

        // Act / Assert
        assert!(matches!(
            decode_message(&bytes),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        // Arrange
        let mut bytes = encode_message(&request(&["AB"], 1, 1), 0).unwrap();
        // First rule's bytes start after header + rule_count + length prefix.
        bytes[HEADER_SIZE + 8] = 0xFF;

        // Act / Assert
        assert!(matches!(
            decode_message(&bytes),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_two_coalesced_frames() {
        // Arrange
        let mut bytes = encode_message(&BridgeMessage::Ping(1), 1).unwrap();
        let first_len = bytes.len();
        bytes.extend(encode_message(&BridgeMessage::Ping(2), 2).unwrap());

        // Act
        let (first, consumed) = decode_message(&bytes).unwrap();
        let (second, _) = decode_message(&bytes[consumed..]).unwrap();

        // Assert
        assert_eq!(consumed, first_len);
        assert_eq!(first.message, BridgeMessage::Ping(1));
        assert_eq!(second.message, BridgeMessage::Ping(2));
        assert_eq!(second.request_id, 2);
    }
}
