//! Error types for framewire.

use thiserror::Error;

/// Main error type for all framewire operations.
#[derive(Debug, Error)]
pub enum FramewireError {
    /// I/O error while reading or writing a frame.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream ended before the first header byte arrived.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The stream accepted fewer bytes than the frame holds.
    ///
    /// Frame boundaries are purely byte-count based, so the connection is
    /// no longer usable after this.
    #[error("Short write: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Encode target ran out of space.
    #[error("Buffer full: need {needed} bytes, {available} available")]
    BufferFull { needed: usize, available: usize },

    /// Payload exceeds what a single frame can carry.
    #[error("Payload size {size} exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Decode source ran out of bytes.
    #[error("Truncated payload: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Message-specific encode failure.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Message-specific decode failure.
    #[error("Decode error: {0}")]
    Decode(String),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// JSON error (header debug view only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol error (malformed header).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A platform call behind the send-queue probe failed.
    #[error("{op} failed: {source}")]
    Probe {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The send-queue probe has no implementation for this target.
    #[error("Unsupported: {0}")]
    Unsupported(&'static str),
}

/// Result type alias using FramewireError.
pub type Result<T> = std::result::Result<T, FramewireError>;
