//! The single-threaded readiness-driven event loop tying the multiplexer,
//! connection table, and store together.
use std::net::SocketAddr;

use mio::net::TcpListener;
use mio::{Events, Poll, PollOpt, Ready, Token};

use support::error::{ErrorKind, NetworkError, NetworkResult};
use support::logging::{debug, warn, Logger};
use support::time::timestamp_secs;

use crate::connection::Connection;
use crate::dispatch::dispatch;
use crate::protocol::parse_record;
use crate::store::Store;

const LISTENER_TOKEN: Token = Token(0);
const EVENTS_CAPACITY: usize = 1024;

/// A connection's `Token` is always its arena slot plus one: slot 0's token
/// is reserved for `LISTENER_TOKEN` and must never be handed to a client.
fn token_of(slot: usize) -> Token {
    Token(slot + 1)
}

fn slot_of(token: Token) -> usize {
    token.0 - 1
}

/// Owns the listener, the poll registration, every live connection, and the
/// store. Connections live in an arena (`Vec<Option<Connection>>`) indexed by
/// arena slot, with a freelist of vacated slots, the same shape the store
/// uses for its entries.
pub struct Reactor {
    poll: Poll,
    listener: TcpListener,
    events: Events,
    connections: Vec<Option<Connection>>,
    free: Vec<usize>,
    store: Store,
    log: Logger,
}

impl Reactor {
    pub fn bind(addr: SocketAddr, capacity: usize, log: Logger) -> NetworkResult<Self> {
        let listener =
            TcpListener::bind(&addr).map_err(|e| NetworkError::Fatal(ErrorKind::Io(e.kind())))?;
        let poll = Poll::new().map_err(|e| NetworkError::Fatal(ErrorKind::Io(e.kind())))?;
        poll.register(&listener, LISTENER_TOKEN, Ready::readable(), PollOpt::level())
            .map_err(|e| NetworkError::Fatal(ErrorKind::Io(e.kind())))?;

        Ok(Reactor {
            poll,
            listener,
            events: Events::with_capacity(EVENTS_CAPACITY),
            connections: Vec::new(),
            free: Vec::new(),
            store: Store::new(capacity),
            log,
        })
    }

    /// Runs forever, one `wait()` batch at a time, until a fatal multiplexer
    /// error occurs. A spurious interrupt is retried transparently.
    pub fn run(&mut self) -> NetworkResult<()> {
        loop {
            self.tick()?;
        }
    }

    fn tick(&mut self) -> NetworkResult<()> {
        match self.poll.poll(&mut self.events, None) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(NetworkError::Fatal(ErrorKind::Io(e.kind()))),
        }

        let ready: Vec<(Token, Ready)> = self
            .events
            .iter()
            .map(|event| (event.token(), event.readiness()))
            .collect();

        for (token, readiness) in ready {
            if token == LISTENER_TOKEN {
                self.accept_all();
                continue;
            }

            if readiness.is_readable() {
                self.handle_readable(token);
            }

            if readiness.is_writable() && self.is_live(token) {
                self.handle_writable(token);
            }
        }

        Ok(())
    }

    fn is_live(&self, token: Token) -> bool {
        self.connections.get(slot_of(token)).map_or(false, |c| c.is_some())
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let token = self.alloc_token();
                    let conn = Connection::new(token, stream);
                    if let Err(e) = conn.register(&self.poll) {
                        warn!(self.log, "failed to register accepted connection"; "error" => %e);
                        self.free.push(slot_of(token));
                        continue;
                    }
                    debug!(self.log, "accepted connection"; "peer" => %peer, "token" => token.0);
                    self.connections[slot_of(token)] = Some(conn);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!(self.log, "accept failed"; "error" => %e);
                    break;
                }
            }
        }
    }

    fn alloc_token(&mut self) -> Token {
        if let Some(slot) = self.free.pop() {
            token_of(slot)
        } else {
            self.connections.push(None);
            token_of(self.connections.len() - 1)
        }
    }

    /// Drains available bytes, extracts and dispatches every complete
    /// record, and tears the connection down on any fatal I/O error, an
    /// outbound overflow, or a stuck full buffer with no newline.
    fn handle_readable(&mut self, token: Token) {
        let idx = slot_of(token);

        loop {
            let result = match self.connections.get_mut(idx).and_then(|c| c.as_mut()) {
                Some(conn) => conn.ingress(),
                None => return,
            };
            match result {
                Ok(0) => break,
                Ok(_) => continue,
                Err(NetworkError::Wait) => break,
                Err(NetworkError::Fatal(_)) => {
                    self.teardown(token);
                    return;
                }
            }
        }

        let now = timestamp_secs();
        let mut extracted_any = false;

        loop {
            let record = match self.connections.get_mut(idx).and_then(|c| c.as_mut()) {
                Some(conn) => conn.read_buffer.take_record(),
                None => return,
            };
            let record = match record {
                Some(r) => r,
                None => break,
            };
            extracted_any = true;

            let outcome = parse_record(&record);
            if let Some(reply) = dispatch(&mut self.store, outcome, now) {
                let enqueued = match self.connections.get_mut(idx).and_then(|c| c.as_mut()) {
                    Some(conn) => conn.enqueue(&reply).is_ok(),
                    None => return,
                };
                if !enqueued {
                    self.teardown(token);
                    return;
                }
            }
        }

        if let Some(conn) = self.connections.get_mut(idx).and_then(|c| c.as_mut()) {
            if conn.read_buffer.is_full() && !extracted_any {
                self.teardown(token);
                return;
            }
            if let Err(e) = conn.sync_interest(&self.poll) {
                warn!(self.log, "failed to sync readiness interest"; "error" => %e);
            }
        }
    }

    fn handle_writable(&mut self, token: Token) {
        let idx = slot_of(token);
        let result = match self.connections.get_mut(idx).and_then(|c| c.as_mut()) {
            Some(conn) => conn.egress(),
            None => return,
        };

        match result {
            Ok(()) | Err(NetworkError::Wait) => {
                if let Some(conn) = self.connections.get_mut(idx).and_then(|c| c.as_mut()) {
                    if let Err(e) = conn.sync_interest(&self.poll) {
                        warn!(self.log, "failed to sync readiness interest"; "error" => %e);
                    }
                }
            }
            Err(NetworkError::Fatal(_)) => self.teardown(token),
        }
    }

    fn teardown(&mut self, token: Token) {
        let slot = slot_of(token);
        if let Some(conn) = self.connections.get_mut(slot).and_then(|c| c.take()) {
            if let Err(e) = conn.deregister(&self.poll) {
                warn!(self.log, "failed to deregister connection"; "error" => %e);
            }
            debug!(self.log, "connection closed"; "token" => token.0);
        }
        self.free.push(slot);
    }
}
