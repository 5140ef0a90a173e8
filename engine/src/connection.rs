//! Per-client state: the socket, its fixed read/write buffers, and its
//! current readiness registration.
use std::net::SocketAddr;

use mio::net::TcpStream;
use mio::{Poll, PollOpt, Ready, Token};

use support::error::NetworkResult;

use crate::buffer::{ReadBuffer, WriteBuffer};

pub struct Connection {
    pub token: Token,
    stream: TcpStream,
    pub read_buffer: ReadBuffer,
    write_buffer: WriteBuffer,
    writable_registered: bool,
}

impl Connection {
    pub fn new(token: Token, stream: TcpStream) -> Self {
        Connection {
            token,
            stream,
            read_buffer: ReadBuffer::new(),
            write_buffer: WriteBuffer::new(),
            writable_registered: false,
        }
    }

    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Registers for readable interest only; writable is added later, on demand.
    pub fn register(&self, poll: &Poll) -> NetworkResult<()> {
        poll.register(&self.stream, self.token, Ready::readable(), PollOpt::level())?;
        Ok(())
    }

    pub fn deregister(&self, poll: &Poll) -> NetworkResult<()> {
        poll.deregister(&self.stream)?;
        Ok(())
    }

    pub fn ingress(&mut self) -> NetworkResult<usize> {
        self.read_buffer.ingress(&mut self.stream)
    }

    pub fn egress(&mut self) -> NetworkResult<()> {
        self.write_buffer.egress(&mut self.stream)
    }

    pub fn enqueue(&mut self, bytes: &[u8]) -> Result<(), ()> {
        self.write_buffer.enqueue(bytes)
    }

    /// Adds or drops writable interest in the poll registration depending on
    /// whether the write buffer currently holds unsent bytes. A no-op if the
    /// registration already matches.
    pub fn sync_interest(&mut self, poll: &Poll) -> NetworkResult<()> {
        let want_writable = self.write_buffer.has_pending();
        if want_writable == self.writable_registered {
            return Ok(());
        }

        let interest = if want_writable {
            Ready::readable() | Ready::writable()
        } else {
            Ready::readable()
        };
        poll.reregister(&self.stream, self.token, interest, PollOpt::level())?;
        self.writable_registered = want_writable;
        Ok(())
    }
}
