//! Fixed-size, never-grown per-connection I/O buffers.
//!
//! Both buffers are exactly `BUFFER_SIZE` bytes regardless of how much data is
//! currently held; there is no heap growth path. This bounds a single command
//! and a single reply to one buffer's worth of bytes, per the transport's
//! resource model.
use std::io::{Read, Write};

use support::error::{ErrorKind, NetworkError, NetworkResult};

pub const BUFFER_SIZE: usize = 4096;

/// Accumulates bytes read off the socket and hands back complete,
/// newline-terminated records one at a time.
pub struct ReadBuffer {
    data: [u8; BUFFER_SIZE],
    len: usize,
}

impl ReadBuffer {
    pub fn new() -> Self {
        ReadBuffer {
            data: [0; BUFFER_SIZE],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == BUFFER_SIZE
    }

    /// Reads as much as is available right now into the buffer's free tail.
    /// Returns `Fatal(ConnectionClosed)` on EOF, `Wait` on would-block.
    pub fn ingress<R: Read>(&mut self, source: &mut R) -> NetworkResult<usize> {
        if self.is_full() {
            return Ok(0);
        }
        let n = source.read(&mut self.data[self.len..])?;
        if n == 0 {
            return Err(NetworkError::Fatal(ErrorKind::ConnectionClosed));
        }
        self.len += n;
        Ok(n)
    }

    /// Extracts the next record (bytes up to, not including, the first `\n`),
    /// left-shifting the remainder down to index 0. Returns `None` if no
    /// newline is present in the valid prefix yet.
    pub fn take_record(&mut self) -> Option<Vec<u8>> {
        let newline_pos = self.data[..self.len].iter().position(|&b| b == b'\n')?;
        let record = self.data[..newline_pos].to_vec();

        let consumed = newline_pos + 1;
        let remainder = self.len - consumed;
        self.data.copy_within(consumed..self.len, 0);
        self.len = remainder;

        Some(record)
    }
}

/// Queues reply bytes and drains them to the socket as writable readiness allows.
pub struct WriteBuffer {
    data: [u8; BUFFER_SIZE],
    filled: usize,
    sent: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        WriteBuffer {
            data: [0; BUFFER_SIZE],
            filled: 0,
            sent: 0,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.sent < self.filled
    }

    /// Appends `bytes` at the current fill position. Fails without mutating
    /// the buffer if there is not enough room; the caller must tear the
    /// connection down rather than truncate.
    pub fn enqueue(&mut self, bytes: &[u8]) -> Result<(), ()> {
        if self.filled + bytes.len() > BUFFER_SIZE {
            return Err(());
        }
        self.data[self.filled..self.filled + bytes.len()].copy_from_slice(bytes);
        self.filled += bytes.len();
        Ok(())
    }

    /// Sends as much of the unsent region as the socket will currently accept.
    /// Resets both cursors to zero once fully drained.
    pub fn egress<W: Write>(&mut self, sink: &mut W) -> NetworkResult<()> {
        while self.sent < self.filled {
            let n = sink.write(&self.data[self.sent..self.filled])?;
            if n == 0 {
                return Err(NetworkError::Fatal(ErrorKind::ConnectionClosed));
            }
            self.sent += n;
        }
        self.sent = 0;
        self.filled = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn take_record_extracts_and_compacts() {
        let mut buf = ReadBuffer::new();
        let mut src = Cursor::new(b"GET a\nGET b\n".to_vec());
        buf.ingress(&mut src).unwrap();

        assert_eq!(buf.take_record().unwrap(), b"GET a");
        assert_eq!(buf.take_record().unwrap(), b"GET b");
        assert!(buf.take_record().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn take_record_waits_without_newline() {
        let mut buf = ReadBuffer::new();
        let mut src = Cursor::new(b"GET a".to_vec());
        buf.ingress(&mut src).unwrap();

        assert!(buf.take_record().is_none());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn take_record_handles_split_reads() {
        let mut buf = ReadBuffer::new();
        let mut first = Cursor::new(b"SET a ".to_vec());
        let mut second = Cursor::new(b"1\n".to_vec());

        buf.ingress(&mut first).unwrap();
        assert!(buf.take_record().is_none());

        buf.ingress(&mut second).unwrap();
        assert_eq!(buf.take_record().unwrap(), b"SET a 1");
    }

    #[test]
    fn ingress_reports_closed_on_eof() {
        let mut buf = ReadBuffer::new();
        let mut src = Cursor::new(Vec::<u8>::new());
        let err = buf.ingress(&mut src).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Fatal(ErrorKind::ConnectionClosed)
        ));
    }

    #[test]
    fn write_buffer_roundtrip() {
        let mut buf = WriteBuffer::new();
        buf.enqueue(b"OK\n").unwrap();
        assert!(buf.has_pending());

        let mut sink = Vec::new();
        buf.egress(&mut sink).unwrap();

        assert_eq!(sink, b"OK\n");
        assert!(!buf.has_pending());
    }

    #[test]
    fn write_buffer_rejects_overflow() {
        let mut buf = WriteBuffer::new();
        let big = vec![b'x'; BUFFER_SIZE];
        buf.enqueue(&big).unwrap();

        assert!(buf.enqueue(b"more").is_err());
    }
}
