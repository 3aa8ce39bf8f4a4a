//! Outbound queue probe: bytes the kernel still holds for a socket.
//!
//! - Linux: `ioctl(SIOCOUTQ)` - unsent plus unacknowledged bytes
//! - macOS/iOS: `getsockopt(SOL_SOCKET, SO_NWRITE)`
//! - Anything else: [`FramewireError::Unsupported`], never a default zero
//!
//! One non-blocking syscall per call; no state, no retries. What to do with
//! the number is left to the connection layer.
//!
//! # Example
//!
//! ```no_run
//! use framewire::transport::SendQueueLen;
//! use std::net::TcpStream;
//!
//! let stream = TcpStream::connect("127.0.0.1:9000")?;
//! let queued = stream.send_queue_len()?;
//! println!("{} bytes waiting to be sent", queued);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::Result;

/// Anything whose outbound socket queue can be measured.
pub trait SendQueueLen {
    /// Bytes queued by the OS for transmission on this socket.
    fn send_queue_len(&self) -> Result<usize>;
}

// ============================================================================
// Unix Implementation
// ============================================================================

#[cfg(unix)]
mod unix_impl {
    use std::os::fd::{AsFd, AsRawFd, RawFd};

    use super::{sys, SendQueueLen};
    use crate::error::Result;

    /// Bytes queued by the OS for transmission on socket `fd`.
    pub fn send_queue_len(fd: RawFd) -> Result<usize> {
        sys::send_queue_len(fd)
    }

    impl<T: AsFd> SendQueueLen for T {
        fn send_queue_len(&self) -> Result<usize> {
            sys::send_queue_len(self.as_fd().as_raw_fd())
        }
    }
}

#[cfg(target_os = "linux")]
mod sys {
    use std::io;
    use std::os::fd::RawFd;

    use crate::error::{FramewireError, Result};

    pub(super) fn send_queue_len(fd: RawFd) -> Result<usize> {
        let mut queued: libc::c_int = 0;
        // SIOCOUTQ is the same request number as TIOCOUTQ.
        let ret = unsafe { libc::ioctl(fd, libc::TIOCOUTQ, &mut queued) };
        if ret < 0 {
            return Err(FramewireError::Probe {
                op: "ioctl(SIOCOUTQ)",
                source: io::Error::last_os_error(),
            });
        }
        Ok(queued.max(0) as usize)
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod sys {
    use std::io;
    use std::mem;
    use std::os::fd::RawFd;

    use crate::error::{FramewireError, Result};

    pub(super) fn send_queue_len(fd: RawFd) -> Result<usize> {
        let mut queued: libc::c_int = 0;
        let mut len = mem::size_of::<libc::c_int>() as libc::socklen_t;
        let ret = unsafe {
            libc::getsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_NWRITE,
                &mut queued as *mut libc::c_int as *mut libc::c_void,
                &mut len,
            )
        };
        if ret < 0 {
            return Err(FramewireError::Probe {
                op: "getsockopt(SO_NWRITE)",
                source: io::Error::last_os_error(),
            });
        }
        Ok(queued.max(0) as usize)
    }
}

#[cfg(all(
    unix,
    not(any(target_os = "linux", target_os = "macos", target_os = "ios"))
))]
mod sys {
    use std::os::fd::RawFd;

    use crate::error::{FramewireError, Result};

    pub(super) fn send_queue_len(_fd: RawFd) -> Result<usize> {
        Err(FramewireError::Unsupported(
            "send queue length is not available on this platform",
        ))
    }
}

// ============================================================================
// Windows Implementation
// ============================================================================

#[cfg(windows)]
mod windows_impl {
    use std::os::windows::io::{AsSocket, RawSocket};

    use super::SendQueueLen;
    use crate::error::{FramewireError, Result};

    const UNSUPPORTED: &str = "send queue length is not available on Windows";

    /// Always [`FramewireError::Unsupported`] on Windows.
    pub fn send_queue_len(_socket: RawSocket) -> Result<usize> {
        Err(FramewireError::Unsupported(UNSUPPORTED))
    }

    impl<T: AsSocket> SendQueueLen for T {
        fn send_queue_len(&self) -> Result<usize> {
            Err(FramewireError::Unsupported(UNSUPPORTED))
        }
    }
}

// ============================================================================
// Fallback Implementation
// ============================================================================

#[cfg(not(any(unix, windows)))]
mod fallback_impl {
    use super::SendQueueLen;
    use crate::error::{FramewireError, Result};

    const UNSUPPORTED: &str = "send queue length is not available on this platform";

    /// Always [`FramewireError::Unsupported`]: no socket handles to probe.
    pub fn send_queue_len<H>(_handle: H) -> Result<usize> {
        Err(FramewireError::Unsupported(UNSUPPORTED))
    }

    impl<T: ?Sized> SendQueueLen for T {
        fn send_queue_len(&self) -> Result<usize> {
            Err(FramewireError::Unsupported(UNSUPPORTED))
        }
    }
}

// ============================================================================
// Platform-independent re-exports
// ============================================================================

#[cfg(unix)]
pub use unix_impl::send_queue_len;

#[cfg(windows)]
pub use windows_impl::send_queue_len;

#[cfg(not(any(unix, windows)))]
pub use fallback_impl::send_queue_len;
