//! Two-tier error model shared across the networking and storage layers.
//!
//! I/O on non-blocking sockets routinely yields `WouldBlock`, which is not a
//! failure but a request to retry later once the reactor says the socket is
//! ready again. Every other error is fatal for the connection (or the whole
//! process, for startup-time errors) and should tear the offending resource
//! down. Splitting the two apart at the type level keeps callers from having
//! to special-case `WouldBlock` by hand at every call site.
use std::fmt;
use std::io;

/// The fatal error kinds that can occur while a connection or the listener is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The peer closed its half of the connection (EOF on read).
    ConnectionClosed,
    /// A record exceeded the fixed read-buffer capacity before a newline arrived.
    RecordTooLarge,
    /// The write buffer could not hold all pending output and had to be dropped.
    WriteOverflow,
    /// A record did not parse as a well-formed command.
    MalformedRecord,
    /// Any other I/O error surfaced by the OS.
    Io(io::ErrorKind),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConnectionClosed => write!(f, "connection closed by peer"),
            ErrorKind::RecordTooLarge => write!(f, "record exceeded buffer capacity"),
            ErrorKind::WriteOverflow => write!(f, "write buffer overflowed"),
            ErrorKind::MalformedRecord => write!(f, "malformed record"),
            ErrorKind::Io(kind) => write!(f, "io error: {:?}", kind),
        }
    }
}

impl std::error::Error for ErrorKind {}

/// The result of attempting a non-blocking network operation.
///
/// `Wait` means the operation could not complete without blocking and should be
/// retried once the reactor reports the socket ready again. `Fatal` means the
/// connection this operation was attempted on must be torn down.
#[derive(Debug)]
pub enum NetworkError {
    Wait,
    Fatal(ErrorKind),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Wait => write!(f, "operation would block"),
            NetworkError::Fatal(kind) => write!(f, "fatal: {}", kind),
        }
    }
}

impl std::error::Error for NetworkError {}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl From<io::Error> for NetworkError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock => NetworkError::Wait,
            kind => NetworkError::Fatal(ErrorKind::Io(kind)),
        }
    }
}

/// Convenience helpers mirroring the checks callers need most often.
pub trait ErrorUtils {
    fn is_wait(&self) -> bool;
    fn has_failed(&self) -> bool;
}

impl<T> ErrorUtils for NetworkResult<T> {
    fn is_wait(&self) -> bool {
        matches!(self, Err(NetworkError::Wait))
    }

    fn has_failed(&self) -> bool {
        matches!(self, Err(NetworkError::Fatal(_)))
    }
}
