//! Raw message - opaque bytes as the payload.
//!
//! Used when the payload is already serialized by a layer above.
//!
//! # Example
//!
//! ```
//! use framewire::codec::RawMessage;
//! use framewire::protocol::{Frame, MessageType};
//! use bytes::Bytes;
//!
//! let msg = RawMessage::new(MessageType::CallReq, 3, Bytes::from_static(b"payload"));
//! let mut frame = Frame::new();
//! frame.write(&msg).unwrap();
//! assert_eq!(frame.payload(), b"payload");
//! ```

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Message, MessageType, ReadBuffer, WriteBuffer};

/// Message whose payload is passed through without transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Correlation id.
    pub id: u32,
    /// Type tag.
    pub message_type: MessageType,
    /// Payload bytes.
    pub payload: Bytes,
}

impl RawMessage {
    /// Create a new raw message.
    pub fn new(message_type: MessageType, id: u32, payload: Bytes) -> Self {
        Self {
            id,
            message_type,
            payload,
        }
    }

    /// Create an empty message, typically as a decode target.
    pub fn empty(message_type: MessageType) -> Self {
        Self::new(message_type, 0, Bytes::new())
    }

    /// Payload length.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

impl Message for RawMessage {
    fn id(&self) -> u32 {
        self.id
    }

    fn message_type(&self) -> MessageType {
        self.message_type
    }

    fn encode(&self, buf: &mut WriteBuffer<'_>) -> Result<()> {
        buf.write_bytes(&self.payload)
    }

    fn decode(&mut self, buf: &mut ReadBuffer<'_>) -> Result<()> {
        // The payload view belongs to the frame, so it is copied out.
        self.payload = Bytes::copy_from_slice(buf.read_remaining());
        Ok(())
    }
}
