//! # framewire
//!
//! Binary frame codec for message-oriented RPC transports.
//!
//! A frame is a fixed 16-byte header followed by at most 65519 payload bytes.
//! [`Frame`](protocol::Frame) owns the buffer, reads and writes whole frames
//! against blocking or async byte streams, and drives
//! [`Message`](protocol::Message) encode/decode through bounded views.
//!
//! ## Architecture
//!
//! - **Protocol**: header codec, owned frame buffer, frame I/O, frame pool
//! - **Codec**: ready-made messages (raw bytes, MessagePack)
//! - **Transport**: outbound socket queue probe for flow control
//!
//! ## Example
//!
//! ```
//! use framewire::codec::RawMessage;
//! use framewire::protocol::{Frame, MessageType};
//! use bytes::Bytes;
//!
//! let mut outbound = Frame::new();
//! outbound
//!     .write(&RawMessage::new(MessageType::CallReq, 42, Bytes::from_static(b"ping")))
//!     .unwrap();
//!
//! let mut wire = Vec::new();
//! outbound.write_out(&mut wire).unwrap();
//!
//! let mut inbound = Frame::new();
//! inbound.read_in(&mut wire.as_slice()).unwrap();
//! assert_eq!(inbound.header().to_string(), "CallReq[42]");
//! ```

pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;

pub use error::{FramewireError, Result};
pub use protocol::{Frame, FrameHeader, Message, MessageType};
