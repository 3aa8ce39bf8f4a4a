//! Wire format encoding and decoding.
//!
//! Implements the 16-byte frame header:
//! ```text
//! ┌──────────┬──────────┬───────────┬──────────┬────────────┐
//! │ Size     │ Msg Type │ Reserved1 │ ID       │ Reserved   │
//! │ 2 bytes  │ 1 byte   │ 1 byte    │ 4 bytes  │ 8 bytes    │
//! │ uint16 BE│          │ zero      │ uint32 BE│ zero       │
//! └──────────┴──────────┴───────────┴──────────┴────────────┘
//! ```
//!
//! `Size` counts the whole frame, header included. All multi-byte integers
//! are Big Endian; peers depend on this, so it is not configurable.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{FramewireError, Result};

/// Header size in bytes (fixed, exactly 16).
pub const HEADER_SIZE: usize = 16;

/// Maximum total frame size, header included.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Maximum payload size of a single frame (65519).
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - HEADER_SIZE;

/// Kind of message carried in a frame's payload.
///
/// Wire values are stable and must never be renumbered. Tags without a named
/// variant decode to [`MessageType::Unknown`] so that no byte is lost on a
/// header round-trip; interpreting them is up to the layer above.
#[derive(Clone, Copy)]
pub enum MessageType {
    InitReq,
    InitRes,
    CallReq,
    CallRes,
    CallReqContinue,
    CallResContinue,
    Cancel,
    Claim,
    PingReq,
    PingRes,
    Error,
    /// Any tag without a named variant.
    Unknown(u8),
}

impl MessageType {
    /// Wire value of this message type.
    pub const fn as_u8(self) -> u8 {
        match self {
            MessageType::InitReq => 0x01,
            MessageType::InitRes => 0x02,
            MessageType::CallReq => 0x03,
            MessageType::CallRes => 0x04,
            MessageType::CallReqContinue => 0x13,
            MessageType::CallResContinue => 0x14,
            MessageType::Cancel => 0xC0,
            MessageType::Claim => 0xC1,
            MessageType::PingReq => 0xD0,
            MessageType::PingRes => 0xD1,
            MessageType::Error => 0xFF,
            MessageType::Unknown(tag) => tag,
        }
    }

    /// Message type for a wire value.
    pub const fn from_u8(tag: u8) -> Self {
        match tag {
            0x01 => MessageType::InitReq,
            0x02 => MessageType::InitRes,
            0x03 => MessageType::CallReq,
            0x04 => MessageType::CallRes,
            0x13 => MessageType::CallReqContinue,
            0x14 => MessageType::CallResContinue,
            0xC0 => MessageType::Cancel,
            0xC1 => MessageType::Claim,
            0xD0 => MessageType::PingReq,
            0xD1 => MessageType::PingRes,
            0xFF => MessageType::Error,
            other => MessageType::Unknown(other),
        }
    }

    /// Check if this tag has a named variant.
    #[inline]
    pub fn is_known(self) -> bool {
        !matches!(Self::from_u8(self.as_u8()), MessageType::Unknown(_))
    }
}

// Equality is by wire value, so `Unknown(0x03)` equals `CallReq`.
impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.as_u8() == other.as_u8()
    }
}

impl Eq for MessageType {}

impl std::hash::Hash for MessageType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_u8().hash(state);
    }
}

impl From<u8> for MessageType {
    fn from(tag: u8) -> Self {
        Self::from_u8(tag)
    }
}

impl From<MessageType> for u8 {
    fn from(ty: MessageType) -> Self {
        ty.as_u8()
    }
}

impl MessageType {
    fn name(self) -> Option<&'static str> {
        let name = match Self::from_u8(self.as_u8()) {
            MessageType::InitReq => "InitReq",
            MessageType::InitRes => "InitRes",
            MessageType::CallReq => "CallReq",
            MessageType::CallRes => "CallRes",
            MessageType::CallReqContinue => "CallReqContinue",
            MessageType::CallResContinue => "CallResContinue",
            MessageType::Cancel => "Cancel",
            MessageType::Claim => "Claim",
            MessageType::PingReq => "PingReq",
            MessageType::PingRes => "PingRes",
            MessageType::Error => "Error",
            MessageType::Unknown(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "MessageType(0x{:02x})", self.as_u8()),
        }
    }
}

// Goes through the wire value like `PartialEq`, so equal tags print alike.
impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown(0x{:02x})", self.as_u8()),
        }
    }
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Decoded frame header.
///
/// The two reserved fields are not stored: they are always written as zero
/// and ignored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Size of the frame including the header.
    size: u16,
    /// Kind of message in the payload.
    pub message_type: MessageType,
    /// Correlation id pairing responses with requests.
    pub id: u32,
}

/// Structured header view for logs and traces.
///
/// Serializes as `{"id":N,"msgType":M,"size":S}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub id: u32,
    #[serde(rename = "msgType")]
    pub msg_type: MessageType,
    pub size: u16,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            size: HEADER_SIZE as u16,
            message_type: MessageType::Unknown(0),
            id: 0,
        }
    }
}

impl FrameHeader {
    /// Create a new header.
    ///
    /// Fails if `payload_size` exceeds [`MAX_PAYLOAD_SIZE`].
    pub fn new(message_type: MessageType, id: u32, payload_size: usize) -> Result<Self> {
        let mut header = Self {
            message_type,
            id,
            ..Self::default()
        };
        header.set_payload_size(payload_size)?;
        Ok(header)
    }

    /// Set the payload size; the frame size becomes `payload_size + 16`.
    pub fn set_payload_size(&mut self, payload_size: usize) -> Result<()> {
        if payload_size > MAX_PAYLOAD_SIZE {
            return Err(FramewireError::PayloadTooLarge {
                size: payload_size,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        self.size = (payload_size + HEADER_SIZE) as u16;
        Ok(())
    }

    /// Payload size declared by the header.
    ///
    /// A header decoded off the wire may declare less than [`HEADER_SIZE`];
    /// that reads as an empty payload here and is rejected by [`validate`](Self::validate).
    #[inline]
    pub fn payload_size(&self) -> usize {
        (self.size as usize).saturating_sub(HEADER_SIZE)
    }

    /// Total frame size declared by the header.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.size as usize
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use framewire::protocol::{FrameHeader, MessageType};
    ///
    /// let header = FrameHeader::new(MessageType::CallReq, 42, 100).unwrap();
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 16);
    /// assert_eq!(&bytes[..2], &116u16.to_be_bytes());
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer. Reserved bytes are zeroed.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (16 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.size.to_be_bytes());
        buf[2] = self.message_type.as_u8();
        buf[3] = 0;
        buf[4..8].copy_from_slice(&self.id.to_be_bytes());
        buf[8..HEADER_SIZE].fill(0);
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short. Reserved bytes are ignored.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            size: u16::from_be_bytes([buf[0], buf[1]]),
            message_type: MessageType::from_u8(buf[2]),
            id: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    /// Check that the declared size covers at least the header itself.
    pub fn validate(&self) -> Result<()> {
        if self.frame_size() < HEADER_SIZE {
            return Err(FramewireError::Protocol(format!(
                "Frame size {} is smaller than the {}-byte header",
                self.size, HEADER_SIZE
            )));
        }
        Ok(())
    }

    /// Structured view of this header.
    pub fn view(&self) -> HeaderView {
        HeaderView {
            id: self.id,
            msg_type: self.message_type,
            size: self.size,
        }
    }

    /// JSON form of [`view`](Self::view).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.view())?)
    }
}

impl fmt::Display for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.message_type, self.id)
    }
}
