//! Codec module - ready-made [`Message`](crate::protocol::Message) types.
//!
//! - [`RawMessage`] - opaque bytes, copied in and out as-is
//! - [`MsgPackMessage`] - serde values as MessagePack (`rmp-serde`, named fields)
//!
//! Both encode straight into the frame's bounded payload region; neither
//! allocates an intermediate buffer on the write path.

mod msgpack;
mod raw;

pub use msgpack::MsgPackMessage;
pub use raw::RawMessage;
