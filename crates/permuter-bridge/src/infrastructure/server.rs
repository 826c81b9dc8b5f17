//! Bridge server: accept loop and per-connection call handling.
//!
//! This module is responsible for:
//!
//! 1. Binding the call socket, failing fast if another bridge already owns it.
//! 2. Accepting connections forever, one Tokio task per connection.
//! 3. Reassembling frames from the TCP byte stream.
//! 4. Running each call on the blocking pool so a long solver search never
//!    stalls other connections.
//! 5. Writing each reply with the request id of the request it answers.
//!
//! # Failure handling
//!
//! A frame that cannot be decoded is answered with an `Error` frame and that
//! connection is closed; other connections are unaffected.  A call that
//! panics is answered with an `InternalError`.  Accept errors are logged and
//! the loop keeps going.  The server has no shutdown protocol of its own: it
//! runs until the process exits.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use permuter_core::protocol::codec::{decode_message, encode_message, peek_request_id, ProtocolError};
use permuter_core::protocol::messages::{BridgeMessage, ErrorCode, ErrorMessage};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::PermuteEndpoint;
use crate::domain::BridgeConfig;

/// Description sent with `InternalError` when a call's worker fails.
pub const INTERNAL_FAILURE: &str = "the call failed inside the bridge";

/// Pause after a failed `accept()` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Another process (probably another bridge) already owns the address.
    #[error("{addr} is already in use; is another bridge running?")]
    BindConflict {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// A bound bridge server, ready to [`serve`](Self::serve).
pub struct BridgeServer {
    listener: TcpListener,
    endpoint: PermuteEndpoint,
}

impl BridgeServer {
    /// Binds the call socket at `config.bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::BindConflict`] if the address is already in use
    /// and [`ServerError::Bind`] for any other bind failure.
    pub async fn bind(config: &BridgeConfig, endpoint: PermuteEndpoint) -> Result<Self, ServerError> {
        let addr = config.bind_addr;
        if !config.is_loopback() {
            warn!(%addr, "binding a non-loopback address; calls are not authenticated");
        }

        let listener = TcpListener::bind(addr).await.map_err(|source| {
            if source.kind() == io::ErrorKind::AddrInUse {
                ServerError::BindConflict { addr, source }
            } else {
                ServerError::Bind { addr, source }
            }
        })?;

        let bound = listener.local_addr().unwrap_or(addr);
        info!(addr = %bound, "bridge listening");
        Ok(Self { listener, endpoint })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the process exits.
    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let conn_id = Uuid::new_v4();
                    debug!(%conn_id, %peer, "connection accepted");
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(%conn_id, "could not disable Nagle: {e}");
                    }
                    let endpoint = self.endpoint.clone();
                    tokio::spawn(handle_connection(stream, endpoint, conn_id));
                }
                Err(e) => {
                    error!("accept error: {e}");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Serves calls on one connection until the peer closes it or sends a frame
/// that cannot be decoded.
///
/// Requests on one connection are answered in order; concurrency comes from
/// running connections in separate tasks.
pub async fn handle_connection<S>(mut stream: S, endpoint: PermuteEndpoint, conn_id: Uuid)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match serve_connection(&mut stream, &endpoint, conn_id).await {
        Ok(()) => debug!(%conn_id, "connection closed"),
        Err(e) => warn!(%conn_id, "connection closed with error: {e}"),
    }
}

async fn serve_connection<S>(
    stream: &mut S,
    endpoint: &PermuteEndpoint,
    conn_id: Uuid,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Accumulates bytes across reads; a read may hold part of a frame or
    // several frames.
    let mut recv_buf: Vec<u8> = Vec::with_capacity(4096);
    let mut read_tmp = vec![0u8; 4096];

    loop {
        let n = stream.read(&mut read_tmp).await?;
        if n == 0 {
            if !recv_buf.is_empty() {
                debug!(%conn_id, pending = recv_buf.len(), "peer closed mid-frame");
            }
            return Ok(());
        }
        recv_buf.extend_from_slice(&read_tmp[..n]);

        loop {
            match decode_message(&recv_buf) {
                Ok((frame, consumed)) => {
                    recv_buf.drain(..consumed);
                    debug!(
                        %conn_id,
                        request_id = frame.request_id,
                        message_type = ?frame.message.message_type(),
                        "request decoded"
                    );
                    let reply = dispatch(frame.message, endpoint, conn_id).await;
                    write_frame(stream, &reply, frame.request_id).await?;
                }
                Err(ProtocolError::InsufficientData { .. }) => break,
                Err(e) => {
                    warn!(%conn_id, error = %e, "undecodable frame; closing connection");
                    // Every other decode error is raised after a full header
                    // was available, so the id is readable.
                    let request_id = peek_request_id(&recv_buf).unwrap_or(0);
                    let reply = BridgeMessage::Error(ErrorMessage {
                        code: error_code_for(&e),
                        description: e.to_string(),
                    });
                    write_frame(stream, &reply, request_id).await?;
                    stream.shutdown().await?;
                    return Ok(());
                }
            }
        }
    }
}

/// Produces the reply for one request.
async fn dispatch(message: BridgeMessage, endpoint: &PermuteEndpoint, conn_id: Uuid) -> BridgeMessage {
    // Liveness probes never touch the solver, so keep them off the blocking pool.
    if let BridgeMessage::Ping(token) = message {
        return BridgeMessage::Pong(token);
    }

    let endpoint = endpoint.clone();
    match tokio::task::spawn_blocking(move || endpoint.handle(message)).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(%conn_id, "call worker failed: {e}");
            BridgeMessage::Error(ErrorMessage {
                code: ErrorCode::InternalError,
                description: INTERNAL_FAILURE.to_string(),
            })
        }
    }
}

fn error_code_for(e: &ProtocolError) -> ErrorCode {
    match e {
        ProtocolError::UnsupportedVersion(_) => ErrorCode::ProtocolVersionMismatch,
        _ => ErrorCode::InvalidMessage,
    }
}

/// Encodes `message` and writes it as one frame.
///
/// A reply that cannot be encoded (e.g. larger than the payload limit) is
/// replaced by an `InternalError` frame so the caller is never left waiting.
async fn write_frame<S>(stream: &mut S, message: &BridgeMessage, request_id: u64) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let bytes = match encode_message(message, request_id) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(request_id, "reply could not be encoded: {e}");
            let fallback = BridgeMessage::Error(ErrorMessage {
                code: ErrorCode::InternalError,
                description: format!("reply could not be encoded: {e}"),
            });
            encode_message(&fallback, request_id)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        }
    };
    stream.write_all(&bytes).await?;
    stream.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
