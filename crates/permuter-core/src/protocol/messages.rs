//! All permuter bridge protocol message types.
//!
//! The protocol exposes exactly one operation, `Permute`, plus a `Ping`/`Pong`
//! liveness probe and an `Error` frame for requests the server could not read.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Total size of the common message header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Largest payload the codec will accept (16 MiB).
///
/// A declared length above this is rejected before any buffer is allocated.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

// ── Message type codes ────────────────────────────────────────────────────────

/// All message type codes defined by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Liveness (0x00–0x0F)
    Ping = 0x01,
    Pong = 0x02,
    // Permute call (0x10–0x1F)
    PermuteRequest = 0x10,
    PermuteResponse = 0x11,
    // Failures (0x7F)
    Error = 0x7F,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::Ping),
            0x02 => Ok(MessageType::Pong),
            0x10 => Ok(MessageType::PermuteRequest),
            0x11 => Ok(MessageType::PermuteResponse),
            0x7F => Ok(MessageType::Error),
            _ => Err(()),
        }
    }
}

// ── Per-message payload structs ───────────────────────────────────────────────

/// PERMUTE_REQUEST (0x10): ask for up to `order_count` part orders of
/// `part_count` parts each that satisfy `rules`.
///
/// The counts are signed because that is what the solver accepts; the bridge
/// forwards them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermuteRequestMessage {
    /// Rule strings in the order the solver must see them.
    pub rules: Vec<String>,
    /// Number of parts in each produced order.
    pub part_count: i32,
    /// Number of valid orders to search for.
    pub order_count: i32,
}

/// PERMUTE_RESPONSE (0x11): the component names of every order found.
///
/// Always rectangular: every row has the same width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PermuteResponseMessage {
    pub rows: Vec<Vec<String>>,
}

/// Error codes carried in an [`ErrorMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    /// The request frame could not be decoded.
    InvalidMessage = 0x01,
    /// The header carried an unsupported protocol version.
    ProtocolVersionMismatch = 0x02,
    /// The message type is valid but not something the receiver accepts.
    UnexpectedMessage = 0x03,
    /// The bridge failed internally (e.g. the worker running the call panicked).
    InternalError = 0x04,
}

impl TryFrom<u8> for ErrorCode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(ErrorCode::InvalidMessage),
            0x02 => Ok(ErrorCode::ProtocolVersionMismatch),
            0x03 => Ok(ErrorCode::UnexpectedMessage),
            0x04 => Ok(ErrorCode::InternalError),
            _ => Err(()),
        }
    }
}

/// ERROR (0x7F): the receiver could not process a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    /// Human-readable description for logs.
    pub description: String,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// Every message that can travel over the bridge socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeMessage {
    /// Liveness probe; echoes the token back in a `Pong`.
    Ping(u64),
    /// Reply to `Ping`.
    Pong(u64),
    PermuteRequest(PermuteRequestMessage),
    PermuteResponse(PermuteResponseMessage),
    Error(ErrorMessage),
}

impl BridgeMessage {
    /// Returns the wire type code for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            BridgeMessage::Ping(_) => MessageType::Ping,
            BridgeMessage::Pong(_) => MessageType::Pong,
            BridgeMessage::PermuteRequest(_) => MessageType::PermuteRequest,
            BridgeMessage::PermuteResponse(_) => MessageType::PermuteResponse,
            BridgeMessage::Error(_) => MessageType::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_try_from_known_codes() {
        assert_eq!(MessageType::try_from(0x01), Ok(MessageType::Ping));
        assert_eq!(MessageType::try_from(0x02), Ok(MessageType::Pong));
        assert_eq!(MessageType::try_from(0x10), Ok(MessageType::PermuteRequest));
        assert_eq!(MessageType::try_from(0x11), Ok(MessageType::PermuteResponse));
        assert_eq!(MessageType::try_from(0x7F), Ok(MessageType::Error));
    }

    #[test]
    fn test_message_type_try_from_unknown_code_fails() {
        assert!(MessageType::try_from(0x00).is_err());
        assert!(MessageType::try_from(0x12).is_err());
        assert!(MessageType::try_from(0xFF).is_err());
    }

    #[test]
    fn test_message_type_matches_variant() {
        let request = BridgeMessage::PermuteRequest(PermuteRequestMessage {
            rules: vec![],
            part_count: 1,
            order_count: 1,
        });
        assert_eq!(request.message_type(), MessageType::PermuteRequest);
        assert_eq!(BridgeMessage::Ping(7).message_type(), MessageType::Ping);
        assert_eq!(
            BridgeMessage::PermuteResponse(PermuteResponseMessage::default()).message_type(),
            MessageType::PermuteResponse
        );
    }

    #[test]
    fn test_error_code_round_trips_through_u8() {
        for code in [
            ErrorCode::InvalidMessage,
            ErrorCode::ProtocolVersionMismatch,
            ErrorCode::UnexpectedMessage,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::try_from(code as u8), Ok(code));
        }
        assert!(ErrorCode::try_from(0x00).is_err());
    }
}
