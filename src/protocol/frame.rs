//! A single wire frame: owned buffer, header, and whole-frame I/O.
//!
//! A [`Frame`] owns exactly one growable buffer. Reading a frame fills the
//! header region, decodes it, grows the buffer if the declared payload needs
//! more room, then fills exactly that many payload bytes. Writing a frame
//! encodes the header in place and hands the whole `frame_size()` prefix to
//! the stream in one write call.
//!
//! Both blocking (`std::io`) and async (`tokio::io`) streams are supported.
//!
//! # Example
//!
//! ```
//! use framewire::protocol::{Frame, MessageType};
//!
//! let mut outbound = Frame::new();
//! outbound.write_payload(MessageType::CallReq, 42, b"hello").unwrap();
//!
//! let mut wire = Vec::new();
//! outbound.write_out(&mut wire).unwrap();
//! assert_eq!(wire.len(), 16 + 5);
//!
//! let mut inbound = Frame::new();
//! inbound.read_in(&mut &wire[..]).unwrap();
//! assert_eq!(inbound.id(), 42);
//! assert_eq!(inbound.payload(), b"hello");
//! ```

use std::io::{self, Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::buffer::{ReadBuffer, WriteBuffer};
use super::frame_buffer::FrameBuffer;
use super::message::Message;
use super::wire_format::{FrameHeader, MessageType, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::error::{FramewireError, Result};

/// Default total frame capacity (header + payload) before any growth.
pub const DEFAULT_FRAME_CAPACITY: usize = 1024;

/// Configuration for newly allocated frames.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Initial total capacity, header included. Raised to at least 16.
    pub initial_capacity: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_FRAME_CAPACITY,
        }
    }
}

/// A frame: header plus bounded payload in one owned buffer.
///
/// Not internally synchronized. One frame serves one read or one write at a
/// time; use separate frames (or a [`FramePool`](super::FramePool)) for
/// concurrent operations.
#[derive(Debug)]
pub struct Frame {
    buffer: FrameBuffer,
    header: FrameHeader,
}

impl Frame {
    /// Create a frame with the default capacity.
    pub fn new() -> Self {
        Self::with_config(&FrameConfig::default())
    }

    /// Create a frame from configuration.
    pub fn with_config(config: &FrameConfig) -> Self {
        Self::with_capacity(config.initial_capacity)
    }

    /// Create a frame with `capacity` total bytes, header included.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: FrameBuffer::with_capacity(capacity),
            header: FrameHeader::default(),
        }
    }

    /// The decoded (or pending) header.
    #[inline]
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Mutable header access, for building frames by hand.
    #[inline]
    pub fn header_mut(&mut self) -> &mut FrameHeader {
        &mut self.header
    }

    /// Get the message type.
    #[inline]
    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    /// Get the correlation id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.header.id
    }

    /// Get the declared payload size.
    #[inline]
    pub fn payload_size(&self) -> usize {
        self.header.payload_size()
    }

    /// Get the declared total frame size.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.header.frame_size()
    }

    /// Total bytes currently allocated, header included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Valid payload bytes: what the last successful read, write or
    /// [`sized_payload`](Self::sized_payload) covered.
    pub fn payload(&self) -> &[u8] {
        &self.buffer.payload()[..self.buffer.len() - HEADER_SIZE]
    }

    /// Payload view of exactly `payload_size()` bytes, growing the buffer if
    /// the header declares more than is allocated.
    pub fn sized_payload(&mut self) -> &mut [u8] {
        let size = self.header.payload_size();
        let frame_size = HEADER_SIZE + size;
        self.buffer.ensure_capacity(frame_size);
        self.buffer.set_len(frame_size);
        &mut self.buffer.payload_mut()[..size]
    }

    /// Zero the header and forget the payload, keeping the allocation.
    pub fn reset(&mut self) {
        self.header = FrameHeader::default();
        self.buffer.clear();
    }

    /// Read exactly one frame from a blocking stream.
    ///
    /// Short reads are retried until the header and then the declared
    /// payload are complete. End-of-stream is always an error:
    /// [`FramewireError::ConnectionClosed`] before the first header byte,
    /// `UnexpectedEof` anywhere after it. On failure the frame is reset and
    /// exposes no payload.
    pub fn read_in<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        let result = self.read_in_inner(reader);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn read_in_inner<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        self.buffer.set_len(HEADER_SIZE);
        fill_header(reader, self.buffer.header_mut())?;
        self.decode_header()?;

        if self.header.payload_size() > 0 {
            reader.read_exact(self.sized_payload())?;
        }

        tracing::trace!(header = %self.header, "frame read");
        Ok(())
    }

    /// Async counterpart of [`read_in`](Self::read_in).
    ///
    /// Cancel-unsafe: dropping the future mid-read leaves the stream
    /// positioned inside a frame.
    pub async fn read_in_async<R: AsyncRead + Unpin + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<()> {
        let result = self.read_in_async_inner(reader).await;
        if result.is_err() {
            self.reset();
        }
        result
    }

    async fn read_in_async_inner<R: AsyncRead + Unpin + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<()> {
        self.buffer.set_len(HEADER_SIZE);
        fill_header_async(reader, self.buffer.header_mut()).await?;
        self.decode_header()?;

        if self.header.payload_size() > 0 {
            reader.read_exact(self.sized_payload()).await?;
        }

        tracing::trace!(header = %self.header, "frame read");
        Ok(())
    }

    fn decode_header(&mut self) -> Result<()> {
        let header = FrameHeader::decode(self.buffer.header()).ok_or_else(|| {
            FramewireError::Protocol("header region shorter than 16 bytes".to_string())
        })?;
        header.validate()?;
        self.header = header;
        Ok(())
    }

    /// Write the whole frame to a blocking stream in a single write call.
    ///
    /// A short write is reported as [`FramewireError::ShortWrite`] and never
    /// retried: the peer has seen a partial frame, so the connection must be
    /// treated as broken.
    pub fn write_out<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let frame_size = self.prepare_write_out()?;
        let written = writer.write(self.buffer.prefix(frame_size))?;
        check_written(written, frame_size)?;
        writer.flush()?;

        tracing::trace!(header = %self.header, "frame written");
        Ok(())
    }

    /// Async counterpart of [`write_out`](Self::write_out).
    pub async fn write_out_async<W: AsyncWrite + Unpin + ?Sized>(
        &mut self,
        writer: &mut W,
    ) -> Result<()> {
        let frame_size = self.prepare_write_out()?;
        let written = writer.write(self.buffer.prefix(frame_size)).await?;
        check_written(written, frame_size)?;
        writer.flush().await?;

        tracing::trace!(header = %self.header, "frame written");
        Ok(())
    }

    /// Encode the header in place and return the number of bytes to send.
    fn prepare_write_out(&mut self) -> Result<usize> {
        self.header.validate()?;
        let frame_size = self.header.frame_size();
        if frame_size > self.buffer.capacity() {
            return Err(FramewireError::Protocol(format!(
                "Header declares {} bytes but only {} are allocated",
                frame_size,
                self.buffer.capacity()
            )));
        }
        self.header.encode_into(self.buffer.header_mut());
        Ok(frame_size)
    }

    /// Encode `msg` into the payload and fill in the header.
    ///
    /// The message writes into a region bounded by the current payload
    /// capacity (never more than [`MAX_PAYLOAD_SIZE`]). If it runs out of
    /// room, the buffer grows and the encode is retried; a message that does
    /// not fit in [`MAX_PAYLOAD_SIZE`] fails with
    /// [`FramewireError::PayloadTooLarge`]. After any failure the payload is
    /// indeterminate and the frame must not be written out until a later
    /// `write` succeeds.
    pub fn write<M: Message + ?Sized>(&mut self, msg: &M) -> Result<()> {
        self.buffer.set_len(HEADER_SIZE);
        loop {
            let bound = self.buffer.payload_capacity().min(MAX_PAYLOAD_SIZE);
            let (result, written, overflowed) = {
                let mut wbuf = WriteBuffer::new(&mut self.buffer.payload_mut()[..bound]);
                let result = msg.encode(&mut wbuf);
                (result, wbuf.bytes_written(), wbuf.is_overflowed())
            };

            match result {
                Ok(()) => {
                    self.header.id = msg.id();
                    self.header.message_type = msg.message_type();
                    self.header.set_payload_size(written)?;
                    self.buffer.set_len(HEADER_SIZE + written);
                    return Ok(());
                }
                Err(err) if overflowed || matches!(err, FramewireError::BufferFull { .. }) => {
                    // Smallest size known not to fit.
                    let needed = match err {
                        FramewireError::BufferFull { needed, .. } => needed.max(bound + 1),
                        _ => bound + 1,
                    };
                    if needed > MAX_PAYLOAD_SIZE {
                        return Err(FramewireError::PayloadTooLarge {
                            size: needed,
                            max: MAX_PAYLOAD_SIZE,
                        });
                    }
                    self.buffer.ensure_capacity(HEADER_SIZE + needed);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Decode `msg` from exactly the declared payload.
    pub fn read<M: Message + ?Sized>(&mut self, msg: &mut M) -> Result<()> {
        let payload = self.sized_payload();
        let mut rbuf = ReadBuffer::new(payload);
        msg.decode(&mut rbuf)
    }

    /// Fill the frame with raw payload bytes.
    ///
    /// Fails fast with [`FramewireError::PayloadTooLarge`] above
    /// [`MAX_PAYLOAD_SIZE`]; otherwise grows as needed.
    pub fn write_payload(
        &mut self,
        message_type: MessageType,
        id: u32,
        payload: &[u8],
    ) -> Result<()> {
        self.header.set_payload_size(payload.len())?;
        self.header.message_type = message_type;
        self.header.id = id;
        self.sized_payload().copy_from_slice(payload);
        Ok(())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill `buf` from `reader`, retrying short reads.
fn fill_header<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(eof_error(filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn fill_header_async<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => return Err(eof_error(filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn eof_error(filled: usize) -> FramewireError {
    if filled == 0 {
        FramewireError::ConnectionClosed
    } else {
        FramewireError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended after {} of {} header bytes", filled, HEADER_SIZE),
        ))
    }
}

fn check_written(written: usize, expected: usize) -> Result<()> {
    if written != expected {
        return Err(FramewireError::ShortWrite { written, expected });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test message: u16 length-prefixed body.
    #[derive(Debug, Default, PartialEq)]
    struct Note {
        id: u32,
        body: Vec<u8>,
    }

    impl Message for Note {
        fn id(&self) -> u32 {
            self.id
        }

        fn message_type(&self) -> MessageType {
            MessageType::CallReq
        }

        fn encode(&self, buf: &mut WriteBuffer<'_>) -> Result<()> {
            buf.write_len16_bytes(&self.body)
        }

        fn decode(&mut self, buf: &mut ReadBuffer<'_>) -> Result<()> {
            self.body = buf.read_len16_bytes()?.to_vec();
            Ok(())
        }
    }

    /// Message that always fails to encode.
    struct Broken;

    impl Message for Broken {
        fn id(&self) -> u32 {
            1
        }

        fn message_type(&self) -> MessageType {
            MessageType::Error
        }

        fn encode(&self, _buf: &mut WriteBuffer<'_>) -> Result<()> {
            Err(FramewireError::Encode("broken".to_string()))
        }

        fn decode(&mut self, _buf: &mut ReadBuffer<'_>) -> Result<()> {
            Err(FramewireError::Decode("broken".to_string()))
        }
    }

    /// Message that checks room up front and reports it without writing.
    struct Reserved(Vec<u8>);

    impl Message for Reserved {
        fn id(&self) -> u32 {
            9
        }

        fn message_type(&self) -> MessageType {
            MessageType::CallRes
        }

        fn encode(&self, buf: &mut WriteBuffer<'_>) -> Result<()> {
            if buf.remaining() < self.0.len() {
                return Err(FramewireError::BufferFull {
                    needed: self.0.len(),
                    available: buf.remaining(),
                });
            }
            buf.write_bytes(&self.0)
        }

        fn decode(&mut self, buf: &mut ReadBuffer<'_>) -> Result<()> {
            self.0 = buf.read_remaining().to_vec();
            Ok(())
        }
    }

    /// Reader that hands out one byte per call.
    struct Trickle<'a> {
        data: &'a [u8],
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() || out.is_empty() {
                return Ok(0);
            }
            out[0] = self.data[0];
            self.data = &self.data[1..];
            Ok(1)
        }
    }

    /// Reader that serves `data`, then fails.
    struct FailAfter<'a> {
        data: &'a [u8],
    }

    impl Read for FailAfter<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            io::Read::read(&mut self.data, out)
        }
    }

    /// Writer that accepts at most `limit` bytes per call.
    struct Stingy {
        limit: usize,
        sink: Vec<u8>,
    }

    impl Write for Stingy {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            let n = data.len().min(self.limit);
            self.sink.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn wire_bytes(message_type: MessageType, id: u32, payload: &[u8]) -> Vec<u8> {
        let mut frame = Frame::new();
        frame.write_payload(message_type, id, payload).unwrap();
        let mut wire = Vec::new();
        frame.write_out(&mut wire).unwrap();
        wire
    }

    #[test]
    fn test_new_frame_defaults() {
        let frame = Frame::new();
        assert_eq!(frame.capacity(), DEFAULT_FRAME_CAPACITY);
        assert_eq!(frame.payload_size(), 0);
        assert_eq!(frame.frame_size(), HEADER_SIZE);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_with_config() {
        let frame = Frame::with_config(&FrameConfig {
            initial_capacity: 4096,
        });
        assert_eq!(frame.capacity(), 4096);
    }

    #[test]
    fn test_end_to_end_roundtrip() {
        let payload = pattern(100);
        let wire = wire_bytes(MessageType::Unknown(7), 42, &payload);
        assert_eq!(wire.len(), HEADER_SIZE + 100);

        let mut inbound = Frame::new();
        inbound.read_in(&mut &wire[..]).unwrap();

        assert_eq!(inbound.message_type().as_u8(), 7);
        assert_eq!(inbound.id(), 42);
        assert_eq!(inbound.payload_size(), 100);
        assert_eq!(inbound.payload(), &payload[..]);
    }

    #[test]
    fn test_write_out_emits_header_then_payload() {
        let wire = wire_bytes(MessageType::CallRes, 0x01020304, b"abc");
        assert_eq!(&wire[0..2], &19u16.to_be_bytes());
        assert_eq!(wire[2], 0x04);
        assert_eq!(wire[3], 0);
        assert_eq!(&wire[4..8], &[1, 2, 3, 4]);
        assert_eq!(&wire[8..16], &[0u8; 8]);
        assert_eq!(&wire[16..], b"abc");
    }

    #[test]
    fn test_empty_payload_frame() {
        let wire = wire_bytes(MessageType::PingReq, 5, b"");
        assert_eq!(wire.len(), HEADER_SIZE);

        let mut inbound = Frame::new();
        inbound.read_in(&mut &wire[..]).unwrap();
        assert_eq!(inbound.message_type(), MessageType::PingReq);
        assert_eq!(inbound.payload_size(), 0);
        assert!(inbound.payload().is_empty());
    }

    #[test]
    fn test_read_in_byte_at_a_time() {
        let payload = pattern(300);
        let wire = wire_bytes(MessageType::CallReq, 77, &payload);

        let mut inbound = Frame::new();
        inbound.read_in(&mut Trickle { data: &wire }).unwrap();

        assert_eq!(inbound.id(), 77);
        assert_eq!(inbound.payload(), &payload[..]);
    }

    #[test]
    fn test_read_in_grows_for_large_payload() {
        let payload = pattern(5000);
        let wire = wire_bytes(MessageType::CallRes, 1, &payload);

        let mut inbound = Frame::new();
        assert_eq!(inbound.capacity(), 1024);
        inbound.read_in(&mut &wire[..]).unwrap();

        assert_eq!(inbound.capacity(), 8192);
        assert_eq!(inbound.payload(), &payload[..]);
    }

    #[test]
    fn test_read_in_clean_eof_is_connection_closed() {
        let mut inbound = Frame::new();
        let result = inbound.read_in(&mut io::empty());
        assert!(matches!(result, Err(FramewireError::ConnectionClosed)));
    }

    #[test]
    fn test_read_in_partial_header_is_unexpected_eof() {
        let wire = wire_bytes(MessageType::CallReq, 1, b"x");
        let mut inbound = Frame::new();
        match inbound.read_in(&mut &wire[..10]) {
            Err(FramewireError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn test_read_in_failure_after_header_exposes_no_payload() {
        let wire = wire_bytes(MessageType::CallReq, 9, &pattern(64));

        let mut inbound = Frame::new();
        let result = inbound.read_in(&mut FailAfter {
            data: &wire[..HEADER_SIZE + 10],
        });

        match result {
            Err(FramewireError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected ConnectionReset, got {:?}", other),
        }
        assert_eq!(inbound.payload_size(), 0);
        assert!(inbound.payload().is_empty());
    }

    #[test]
    fn test_read_in_truncated_payload() {
        let wire = wire_bytes(MessageType::CallReq, 9, &pattern(64));
        let mut inbound = Frame::new();
        match inbound.read_in(&mut &wire[..wire.len() - 1]) {
            Err(FramewireError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        assert!(inbound.payload().is_empty());
    }

    #[test]
    fn test_read_in_rejects_undersized_header() {
        let mut wire = [0u8; HEADER_SIZE];
        wire[0..2].copy_from_slice(&4u16.to_be_bytes());
        let mut inbound = Frame::new();
        let result = inbound.read_in(&mut &wire[..]);
        assert!(matches!(result, Err(FramewireError::Protocol(_))));
    }

    #[test]
    fn test_read_in_consecutive_frames_reuse_frame() {
        let mut wire = wire_bytes(MessageType::CallReq, 1, &pattern(2000));
        wire.extend(wire_bytes(MessageType::CallRes, 2, b"short"));
        let mut reader = &wire[..];

        let mut frame = Frame::new();
        frame.read_in(&mut reader).unwrap();
        assert_eq!(frame.id(), 1);
        assert_eq!(frame.payload().len(), 2000);

        frame.read_in(&mut reader).unwrap();
        assert_eq!(frame.id(), 2);
        assert_eq!(frame.payload(), b"short");
        // Capacity kept from the larger frame
        assert_eq!(frame.capacity(), 2048);

        assert!(matches!(
            frame.read_in(&mut reader),
            Err(FramewireError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_short_write_is_an_error() {
        let mut frame = Frame::new();
        frame.write_payload(MessageType::CallReq, 1, &pattern(100)).unwrap();

        let mut writer = Stingy {
            limit: 50,
            sink: Vec::new(),
        };
        let result = frame.write_out(&mut writer);
        assert!(matches!(
            result,
            Err(FramewireError::ShortWrite {
                written: 50,
                expected: 116
            })
        ));
        // Not retried
        assert_eq!(writer.sink.len(), 50);
    }

    #[test]
    fn test_write_out_rejects_header_beyond_allocation() {
        let mut frame = Frame::new();
        frame.header_mut().set_payload_size(5000).unwrap();
        let mut wire = Vec::new();
        assert!(matches!(
            frame.write_out(&mut wire),
            Err(FramewireError::Protocol(_))
        ));
        assert!(wire.is_empty());
    }

    #[test]
    fn test_message_write_read_roundtrip() {
        let note = Note {
            id: 42,
            body: b"hello frame".to_vec(),
        };
        let mut outbound = Frame::new();
        outbound.write(&note).unwrap();

        assert_eq!(outbound.id(), 42);
        assert_eq!(outbound.message_type(), MessageType::CallReq);
        assert_eq!(outbound.payload_size(), 2 + note.body.len());

        let mut wire = Vec::new();
        outbound.write_out(&mut wire).unwrap();

        let mut inbound = Frame::new();
        inbound.read_in(&mut &wire[..]).unwrap();
        let mut decoded = Note::default();
        inbound.read(&mut decoded).unwrap();
        assert_eq!(decoded.body, note.body);
    }

    #[test]
    fn test_message_write_grows_minimally() {
        let note = Note {
            id: 1,
            body: pattern(3000),
        };
        let mut frame = Frame::new();
        frame.write(&note).unwrap();

        // 16 + 2 + 3000 fits in 4096, the first doubling of 1024 that does
        assert_eq!(frame.capacity(), 4096);
        assert_eq!(frame.payload_size(), 3002);
        assert_eq!(&frame.payload()[2..], &note.body[..]);
    }

    #[test]
    fn test_message_reporting_buffer_full_grows() {
        let msg = Reserved(pattern(4000));
        let mut frame = Frame::new();
        frame.write(&msg).unwrap();

        assert_eq!(frame.capacity(), 4096);
        assert_eq!(frame.payload_size(), 4000);
        assert_eq!(frame.payload(), &msg.0[..]);
    }

    #[test]
    fn test_message_reporting_buffer_full_past_max_rejected() {
        let mut frame = Frame::new();
        let result = frame.write(&Reserved(pattern(MAX_PAYLOAD_SIZE + 1)));
        assert!(matches!(
            result,
            Err(FramewireError::PayloadTooLarge { size: 65520, max: 65519 })
        ));
    }

    #[test]
    fn test_growth_preserves_header_bytes() {
        let wire = wire_bytes(MessageType::CallReq, 0xABCD, b"tiny");
        let mut frame = Frame::new();
        frame.read_in(&mut &wire[..]).unwrap();
        let header_before = wire[..HEADER_SIZE].to_vec();

        frame.header_mut().set_payload_size(10_000).unwrap();
        frame.sized_payload();

        assert_eq!(frame.capacity(), 16384);
        assert_eq!(frame.buffer.header(), &header_before[..]);
    }

    #[test]
    fn test_max_payload_roundtrip() {
        let payload = pattern(MAX_PAYLOAD_SIZE);
        let wire = wire_bytes(MessageType::CallRes, 3, &payload);
        assert_eq!(wire.len(), 65535);

        let mut inbound = Frame::new();
        inbound.read_in(&mut &wire[..]).unwrap();
        assert_eq!(inbound.payload_size(), MAX_PAYLOAD_SIZE);
        assert_eq!(inbound.payload(), &payload[..]);
    }

    #[test]
    fn test_max_payload_message_fits() {
        let note = Note {
            id: 1,
            body: pattern(MAX_PAYLOAD_SIZE - 2),
        };
        let mut frame = Frame::new();
        frame.write(&note).unwrap();
        assert_eq!(frame.payload_size(), MAX_PAYLOAD_SIZE);
        assert_eq!(frame.capacity(), 65536);
    }

    #[test]
    fn test_oversized_payload_fails_fast() {
        let mut frame = Frame::new();
        let result = frame.write_payload(MessageType::CallReq, 1, &pattern(MAX_PAYLOAD_SIZE + 1));
        assert!(matches!(
            result,
            Err(FramewireError::PayloadTooLarge { size: 65520, .. })
        ));
        // Nothing allocated for it
        assert_eq!(frame.capacity(), DEFAULT_FRAME_CAPACITY);
    }

    #[test]
    fn test_oversized_message_rejected() {
        let note = Note {
            id: 1,
            body: pattern(MAX_PAYLOAD_SIZE),
        };
        let mut frame = Frame::new();
        let result = frame.write(&note);
        assert!(matches!(
            result,
            Err(FramewireError::PayloadTooLarge { max: 65519, .. })
        ));
    }

    #[test]
    fn test_message_encode_error_propagated() {
        let mut frame = Frame::new();
        let result = frame.write(&Broken);
        assert!(matches!(result, Err(FramewireError::Encode(_))));
        assert_eq!(frame.capacity(), DEFAULT_FRAME_CAPACITY);
    }

    #[test]
    fn test_message_decode_error_propagated() {
        let wire = wire_bytes(MessageType::CallReq, 1, &[0x00, 0x09, b'a']);
        let mut frame = Frame::new();
        frame.read_in(&mut &wire[..]).unwrap();

        let mut note = Note::default();
        assert!(matches!(
            frame.read(&mut note),
            Err(FramewireError::Truncated { needed: 9, remaining: 1 })
        ));
        assert!(matches!(
            frame.read(&mut Broken),
            Err(FramewireError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_sees_exactly_declared_payload() {
        // Earlier, longer frame leaves stale bytes past the new payload
        let mut wire = wire_bytes(MessageType::CallReq, 1, &[0x00, 0x04, 1, 2, 3, 4]);
        wire.extend(wire_bytes(MessageType::CallReq, 2, &[0x00, 0x04, 9]));
        let mut reader = &wire[..];

        let mut frame = Frame::new();
        frame.read_in(&mut reader).unwrap();
        frame.read_in(&mut reader).unwrap();

        let mut note = Note::default();
        assert!(matches!(
            frame.read(&mut note),
            Err(FramewireError::Truncated { .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut frame = Frame::new();
        frame.write_payload(MessageType::CallReq, 8, &pattern(2000)).unwrap();
        frame.reset();
        assert_eq!(frame.id(), 0);
        assert_eq!(frame.payload_size(), 0);
        assert!(frame.payload().is_empty());
        assert_eq!(frame.capacity(), 2048);
    }

    #[tokio::test]
    async fn test_async_roundtrip_with_short_reads() {
        let payload = pattern(1000);
        let wire = wire_bytes(MessageType::CallRes, 42, &payload);
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);

        // Dribble the frame out in 7-byte pieces so the reader sees short reads
        let writer = tokio::spawn(async move {
            for chunk in wire.chunks(7) {
                client.write_all(chunk).await?;
                tokio::task::yield_now().await;
            }
            Ok::<_, io::Error>(())
        });

        let mut inbound = Frame::new();
        inbound.read_in_async(&mut server).await.unwrap();
        writer.await.unwrap().unwrap();

        assert_eq!(inbound.message_type(), MessageType::CallRes);
        assert_eq!(inbound.id(), 42);
        assert_eq!(inbound.payload(), &payload[..]);
    }

    #[tokio::test]
    async fn test_async_write_out() {
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        let mut outbound = Frame::new();
        outbound.write_payload(MessageType::PingRes, 11, b"pong").unwrap();
        outbound.write_out_async(&mut client).await.unwrap();

        let mut wire = [0u8; HEADER_SIZE + 4];
        server.read_exact(&mut wire).await.unwrap();
        assert_eq!(wire[2], 0xD1);
        assert_eq!(&wire[HEADER_SIZE..], b"pong");
    }

    #[tokio::test]
    async fn test_async_short_write_is_an_error() {
        // Duplex buffer smaller than the frame accepts only part of it
        let (mut client, _server) = tokio::io::duplex(32);
        let mut outbound = Frame::new();
        outbound.write_payload(MessageType::CallReq, 1, &pattern(100)).unwrap();

        let result = outbound.write_out_async(&mut client).await;
        assert!(matches!(
            result,
            Err(FramewireError::ShortWrite {
                written: 32,
                expected: 116
            })
        ));
    }

    #[tokio::test]
    async fn test_async_read_closed_stream() {
        let (client, mut server) = tokio::io::duplex(64);
        drop(client);

        let mut inbound = Frame::new();
        let result = inbound.read_in_async(&mut server).await;
        assert!(matches!(result, Err(FramewireError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_async_read_peer_gone_mid_payload() {
        let wire = wire_bytes(MessageType::CallReq, 5, &pattern(200));
        let (mut client, mut server) = tokio::io::duplex(4096);
        client.write_all(&wire[..HEADER_SIZE + 50]).await.unwrap();
        drop(client);

        let mut inbound = Frame::new();
        match inbound.read_in_async(&mut server).await {
            Err(FramewireError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        assert!(inbound.payload().is_empty());
    }
}
