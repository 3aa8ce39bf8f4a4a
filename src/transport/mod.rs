//! Transport module - platform-specific socket helpers.
//!
//! Provides the outbound queue probe over:
//! - `ioctl(SIOCOUTQ)` (Linux)
//! - `getsockopt(SO_NWRITE)` (macOS/iOS)
//! - an `Unsupported` error everywhere else

mod send_queue;

pub use send_queue::{send_queue_len, SendQueueLen};
