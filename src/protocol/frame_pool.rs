//! Pool of reusable frames.
//!
//! Avoids a fresh allocation per frame on busy connections. Frames are moved
//! out on [`acquire`](FramePool::acquire) and moved back on
//! [`release`](FramePool::release), so a frame has exactly one owner at a
//! time and the pool itself needs no locking.
//!
//! # Design
//!
//! - Released frames are reset (header zeroed, payload forgotten) but keep
//!   whatever capacity they grew to.
//! - At most `max_idle` frames are kept; extras are dropped.
//! - A thread-local pool is available through [`with_frame_pool`] for
//!   single-threaded executors.
//!
//! # Usage
//!
//! ```
//! use framewire::protocol::{FramePool, MessageType};
//!
//! let mut pool = FramePool::new();
//! let mut frame = pool.acquire();
//! frame.write_payload(MessageType::PingReq, 1, b"").unwrap();
//! // ... write it out ...
//! pool.release(frame);
//! assert_eq!(pool.idle(), 1);
//! ```

use std::cell::RefCell;

use super::frame::{Frame, FrameConfig};

/// Default number of idle frames kept by a pool.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Configuration for a [`FramePool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// How new frames are allocated.
    pub frame: FrameConfig,
    /// Maximum idle frames retained.
    pub max_idle: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            max_idle: DEFAULT_POOL_SIZE,
        }
    }
}

/// A bounded stack of idle frames.
#[derive(Debug)]
pub struct FramePool {
    idle: Vec<Frame>,
    config: PoolConfig,
}

impl FramePool {
    /// Create an empty pool with default settings.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create an empty pool.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            idle: Vec::with_capacity(config.max_idle),
            config,
        }
    }

    /// Take an idle frame, or allocate one if none is idle.
    pub fn acquire(&mut self) -> Frame {
        match self.idle.pop() {
            Some(frame) => frame,
            None => Frame::with_config(&self.config.frame),
        }
    }

    /// Return a frame to the pool.
    pub fn release(&mut self, mut frame: Frame) {
        if self.idle.len() >= self.config.max_idle {
            tracing::trace!(capacity = frame.capacity(), "frame pool full, dropping frame");
            return;
        }
        frame.reset();
        self.idle.push(frame);
    }

    /// Number of idle frames.
    #[inline]
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Maximum idle frames retained.
    #[inline]
    pub fn max_idle(&self) -> usize {
        self.config.max_idle
    }

    /// Drop all idle frames.
    pub fn clear(&mut self) {
        self.idle.clear();
    }
}

impl Default for FramePool {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static THREAD_LOCAL_POOL: RefCell<FramePool> = RefCell::new(FramePool::new());
}

/// Access the thread-local frame pool.
///
/// # Panics
///
/// Panics if called re-entrantly from inside `f`.
pub fn with_frame_pool<F, R>(f: F) -> R
where
    F: FnOnce(&mut FramePool) -> R,
{
    THREAD_LOCAL_POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        f(&mut pool)
    })
}
