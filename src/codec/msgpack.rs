//! MsgPack messages using `rmp-serde`.
//!
//! Values are always written with `write_named` (structs as maps with field
//! names), never positional arrays, so peers in other languages can decode
//! them without sharing field order.
//!
//! # Example
//!
//! ```
//! use framewire::codec::MsgPackMessage;
//! use framewire::protocol::{Frame, MessageType};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
//! struct Call {
//!     method: String,
//!     arg: u32,
//! }
//!
//! let call = Call { method: "echo".to_string(), arg: 7 };
//! let mut frame = Frame::new();
//! frame.write(&MsgPackMessage::new(MessageType::CallReq, 42, call)).unwrap();
//!
//! let mut decoded = MsgPackMessage::<Call>::default();
//! frame.read(&mut decoded).unwrap();
//! assert_eq!(decoded.value.method, "echo");
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FramewireError, Result};
use crate::protocol::{Message, MessageType, ReadBuffer, WriteBuffer};

/// A serde value carried as a MessagePack payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MsgPackMessage<T> {
    /// Correlation id.
    pub id: u32,
    /// Type tag.
    pub message_type: MessageType,
    /// The value itself.
    pub value: T,
}

impl<T> MsgPackMessage<T> {
    /// Create a new message.
    pub fn new(message_type: MessageType, id: u32, value: T) -> Self {
        Self {
            id,
            message_type,
            value,
        }
    }

    /// Consume the message, returning the value.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Default> Default for MsgPackMessage<T> {
    fn default() -> Self {
        Self::new(MessageType::Unknown(0), 0, T::default())
    }
}

impl<T> Message for MsgPackMessage<T>
where
    T: Serialize + DeserializeOwned,
{
    fn id(&self) -> u32 {
        self.id
    }

    fn message_type(&self) -> MessageType {
        self.message_type
    }

    fn encode(&self, buf: &mut WriteBuffer<'_>) -> Result<()> {
        rmp_serde::encode::write_named(buf, &self.value).map_err(|err| {
            // The serializer wraps our WriteZero; report it as lack of space
            // so the frame can grow.
            if buf.is_overflowed() {
                FramewireError::BufferFull {
                    needed: buf.capacity() + 1,
                    available: buf.capacity(),
                }
            } else {
                FramewireError::MsgPackEncode(err)
            }
        })
    }

    fn decode(&mut self, buf: &mut ReadBuffer<'_>) -> Result<()> {
        self.value = rmp_serde::from_slice(buf.read_remaining())?;
        Ok(())
    }
}
