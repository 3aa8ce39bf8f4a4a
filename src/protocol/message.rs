//! The contract a payload type fulfils to travel inside a frame.

use super::buffer::{ReadBuffer, WriteBuffer};
use super::wire_format::MessageType;
use crate::error::Result;

/// A message that can be carried in a single frame.
///
/// Implementations encode into, and decode from, a region bounded to the
/// frame's payload. Running out of space while encoding must surface as
/// [`FramewireError::BufferFull`](crate::FramewireError::BufferFull) (which
/// every [`WriteBuffer`] method already does) so the frame can grow and retry.
pub trait Message {
    /// Correlation id written into the frame header.
    fn id(&self) -> u32;

    /// Type tag written into the frame header.
    fn message_type(&self) -> MessageType;

    /// Write the encoded message into `buf`.
    fn encode(&self, buf: &mut WriteBuffer<'_>) -> Result<()>;

    /// Populate `self` from exactly the frame's payload.
    fn decode(&mut self, buf: &mut ReadBuffer<'_>) -> Result<()>;
}
