//! Caller-side connection to a running bridge.
//!
//! A controller opens one [`BridgeClient`] and issues calls on it one at a
//! time.  Each call is stamped with a fresh request id; replies carrying an
//! older id (left over from a call that timed out) are skipped.
//!
//! # Example
//!
//! ```no_run
//! use permuter_bridge::infrastructure::client::BridgeClient;
//! use permuter_core::prepare_rules;
//!
//! # async fn example() -> Result<(), permuter_bridge::infrastructure::client::ClientError> {
//! let mut client = BridgeClient::connect("127.0.0.1:25333".parse().unwrap()).await?;
//! let prepared = prepare_rules(["STARTSWITH L1", "CONTAINS L1", "CONTAINS P1"]);
//! let orders = client
//!     .permute(prepared.rules.into_vec(), prepared.part_count, 100)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use permuter_core::protocol::codec::{decode_message, encode_message, Frame, ProtocolError};
use permuter_core::protocol::messages::{
    BridgeMessage, ErrorCode, MessageType, PermuteRequestMessage,
};
use permuter_core::protocol::RequestIdCounter;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Errors a caller can see from a bridge call.
///
/// Solver failures are not among them: the bridge absorbs those and answers
/// with a (possibly empty) result.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to bridge at {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("bridge connection I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bridge closed the connection")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The bridge answered with an `Error` frame.
    #[error("bridge rejected the request ({code:?}): {description}")]
    Remote { code: ErrorCode, description: String },

    /// The reply was a valid frame of the wrong kind.
    #[error("unexpected {0:?} reply")]
    UnexpectedReply(MessageType),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The reply answers a request that was never sent on this connection.
    #[error("reply carries request id {actual}, expected {expected}")]
    RequestIdMismatch { expected: u64, actual: u64 },
}

/// A connection to a bridge server.
pub struct BridgeClient {
    stream: TcpStream,
    ids: RequestIdCounter,
    recv_buf: Vec<u8>,
    timeout: Option<Duration>,
}

impl BridgeClient {
    /// Connects to the bridge at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if no bridge is reachable there.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect { addr, source })?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            ids: RequestIdCounter::new(),
            recv_buf: Vec::with_capacity(4096),
            timeout: None,
        })
    }

    /// Limits how long each call waits for its reply.
    ///
    /// The bridge does not cancel a call that times out; its late reply is
    /// discarded when it arrives.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Asks the bridge for up to `order_count` orders of `part_count` parts
    /// satisfying `rules`, and returns their component names.
    ///
    /// An empty result may mean the rules are infeasible or that the solver
    /// failed; the bridge does not distinguish the two.
    pub async fn permute<I, S>(
        &mut self,
        rules: I,
        part_count: i32,
        order_count: i32,
    ) -> Result<Vec<Vec<String>>, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = BridgeMessage::PermuteRequest(PermuteRequestMessage {
            rules: rules.into_iter().map(Into::into).collect(),
            part_count,
            order_count,
        });
        match self.call(request).await? {
            BridgeMessage::PermuteResponse(response) => Ok(response.rows),
            other => Err(ClientError::UnexpectedReply(other.message_type())),
        }
    }

    /// Checks the bridge is alive; succeeds when it echoes `token` back.
    pub async fn ping(&mut self, token: u64) -> Result<(), ClientError> {
        match self.call(BridgeMessage::Ping(token)).await? {
            BridgeMessage::Pong(echoed) if echoed == token => Ok(()),
            other => Err(ClientError::UnexpectedReply(other.message_type())),
        }
    }

    async fn call(&mut self, request: BridgeMessage) -> Result<BridgeMessage, ClientError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(request))
                .await
                .map_err(|_| ClientError::Timeout(limit))?,
            None => self.exchange(request).await,
        }
    }

    async fn exchange(&mut self, request: BridgeMessage) -> Result<BridgeMessage, ClientError> {
        let request_id = self.ids.next();
        let bytes = encode_message(&request, request_id)?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;

        loop {
            let frame = self.read_frame().await?;
            // 0 marks an error about a frame the bridge could not read.
            if frame.request_id != 0 && frame.request_id < request_id {
                debug!(
                    stale = frame.request_id,
                    request_id, "discarding reply to an earlier request"
                );
                continue;
            }
            if let BridgeMessage::Error(e) = frame.message {
                return Err(ClientError::Remote {
                    code: e.code,
                    description: e.description,
                });
            }
            if frame.request_id != request_id {
                return Err(ClientError::RequestIdMismatch {
                    expected: request_id,
                    actual: frame.request_id,
                });
            }
            return Ok(frame.message);
        }
    }

    /// Reads until one complete frame is buffered, then returns it.
    async fn read_frame(&mut self) -> Result<Frame, ClientError> {
        let mut read_tmp = [0u8; 4096];
        loop {
            match decode_message(&self.recv_buf) {
                Ok((frame, consumed)) => {
                    self.recv_buf.drain(..consumed);
                    return Ok(frame);
                }
                Err(ProtocolError::InsufficientData { .. }) => {}
                Err(e) => return Err(e.into()),
            }

            let n = self.stream.read(&mut read_tmp).await?;
            if n == 0 {
                return Err(ClientError::Closed);
            }
            self.recv_buf.extend_from_slice(&read_tmp[..n]);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
