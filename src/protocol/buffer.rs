//! Bounded read/write views handed to messages.
//!
//! A [`WriteBuffer`] wraps the payload region of a frame and refuses to write
//! past its end; a [`ReadBuffer`] wraps exactly the declared payload and
//! refuses to read past it. Integers are Big Endian, matching the header.
//!
//! # Example
//!
//! ```
//! use framewire::protocol::{ReadBuffer, WriteBuffer};
//!
//! let mut storage = [0u8; 8];
//! let mut wbuf = WriteBuffer::new(&mut storage);
//! wbuf.write_u16(0xCAFE).unwrap();
//! wbuf.write_len16_bytes(b"hi").unwrap();
//! assert_eq!(wbuf.bytes_written(), 6);
//! assert!(wbuf.write_u32(1).is_err());
//!
//! let mut rbuf = ReadBuffer::new(&storage[..6]);
//! assert_eq!(rbuf.read_u16().unwrap(), 0xCAFE);
//! assert_eq!(rbuf.read_len16_bytes().unwrap(), b"hi");
//! ```

use std::io;

use bytes::{Buf, BufMut};

use crate::error::{FramewireError, Result};

/// Size-bounded encode target.
#[derive(Debug)]
pub struct WriteBuffer<'a> {
    buf: &'a mut [u8],
    written: usize,
    overflowed: bool,
}

impl<'a> WriteBuffer<'a> {
    /// Wrap a region; nothing beyond `buf.len()` can be written.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            written: 0,
            overflowed: false,
        }
    }

    /// Total bytes this buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// Bytes still free.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.written
    }

    /// True once any write has been refused for lack of space.
    ///
    /// Sticky, so encoders that swallow the underlying error (serde
    /// serializers wrapping `io::Error`) can still be told apart from
    /// malformed content.
    #[inline]
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// The bytes written so far.
    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        if n > self.remaining() {
            self.overflowed = true;
            return Err(FramewireError::BufferFull {
                needed: self.written + n,
                available: self.buf.len(),
            });
        }
        let start = self.written;
        self.written += n;
        Ok(&mut self.buf[start..start + n])
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        let mut dst = self.reserve(1)?;
        dst.put_u8(value);
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        let mut dst = self.reserve(2)?;
        dst.put_u16(value);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        let mut dst = self.reserve(4)?;
        dst.put_u32(value);
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        let mut dst = self.reserve(8)?;
        dst.put_u64(value);
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Write `data` prefixed by its length as a u16.
    pub fn write_len16_bytes(&mut self, data: &[u8]) -> Result<()> {
        let len = u16::try_from(data.len()).map_err(|_| {
            FramewireError::Encode(format!(
                "{} bytes do not fit a 16-bit length prefix",
                data.len()
            ))
        })?;
        if 2 + data.len() > self.remaining() {
            self.overflowed = true;
            return Err(FramewireError::BufferFull {
                needed: self.written + 2 + data.len(),
                available: self.buf.len(),
            });
        }
        self.write_u16(len)?;
        self.write_bytes(data)
    }
}

impl io::Write for WriteBuffer<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let n = data.len().min(self.remaining());
        if n < data.len() {
            self.overflowed = true;
        }
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write buffer full",
            ));
        }
        let start = self.written;
        self.buf[start..start + n].copy_from_slice(&data[..n]);
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Size-bounded decode source.
#[derive(Debug, Clone)]
pub struct ReadBuffer<'a> {
    buf: &'a [u8],
    len: usize,
}

impl<'a> ReadBuffer<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            len: buf.len(),
        }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn bytes_read(&self) -> usize {
        self.len - self.buf.len()
    }

    fn check(&self, n: usize) -> Result<()> {
        if n > self.buf.len() {
            return Err(FramewireError::Truncated {
                needed: n,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.check(8)?;
        Ok(self.buf.get_u64())
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.check(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Read bytes prefixed by a u16 length.
    pub fn read_len16_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len)
    }

    /// Consume and borrow everything left.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buf)
    }
}

impl io::Read for ReadBuffer<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.buf, out)
    }
}
