//! Protocol module - wire format, buffers, and frames.
//!
//! This module implements the binary framing layer:
//! - 16-byte header encoding/decoding
//! - Bounded read/write views for message codecs
//! - Owned growable frame buffer
//! - Frame with whole-frame stream I/O
//! - Frame pool for reuse across frames

mod buffer;
mod frame;
mod frame_buffer;
mod frame_pool;
mod message;
mod wire_format;

pub use buffer::{ReadBuffer, WriteBuffer};
pub use frame::{Frame, FrameConfig, DEFAULT_FRAME_CAPACITY};
pub use frame_pool::{with_frame_pool, FramePool, PoolConfig, DEFAULT_POOL_SIZE};
pub use message::Message;
pub use wire_format::{
    FrameHeader, HeaderView, MessageType, HEADER_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
