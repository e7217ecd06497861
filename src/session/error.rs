// ABOUTME: Session error types covering connection, bind, correlation and send failures
// ABOUTME: Structured reporting with automatic conversion from underlying I/O errors

use std::io;

use thiserror::Error;

use crate::datatypes::CommandStatus;
use crate::session::state::SessionState;

/// Error type for all session operations.
#[derive(Debug, Error)]
pub enum SmppError {
    /// I/O failure reported by the transport layer.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The transport did not come up within the connect timeout.
    #[error("connection timed out")]
    ConnectionTimeout,

    /// The SMSC answered the bind request with a non-zero status.
    #[error("bind rejected: {0:?}")]
    BindRejected(CommandStatus),

    /// A correlated request was answered with a non-zero status.
    #[error("request rejected: {0:?}")]
    RequestRejected(CommandStatus),

    /// No response arrived within the per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// The session was closed while the operation was in flight, or the
    /// operation was attempted after shutdown.
    #[error("session closed")]
    SessionClosed,

    /// A message operation was attempted before the bind completed.
    #[error("session not bound")]
    NotBound,

    /// A correlated response arrived with the right sequence number but
    /// the wrong PDU type.
    #[error("unexpected PDU: expected {expected}, got {actual}")]
    UnexpectedPdu {
        expected: &'static str,
        actual: &'static str,
    },

    /// The session is not in a state that permits the operation.
    #[error("invalid session state: expected {expected}, currently {actual}")]
    InvalidState {
        expected: &'static str,
        actual: SessionState,
    },

    /// A segmented send failed partway through. Parts accepted before the
    /// failure stay accepted; their message ids are reported here.
    #[error("sent {}/{total} message parts before failure: {source}", sent.len())]
    PartialSend {
        /// SMSC message ids of the parts that were accepted.
        sent: Vec<String>,
        /// Total number of parts the message was split into.
        total: usize,
        /// The failure that stopped the remaining parts.
        #[source]
        source: Box<SmppError>,
    },

    /// Data validation error (over-long message, bad segment limit, ...).
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for session operations.
pub type SmppResult<T> = Result<T, SmppError>;
