//! Unified error type.

use std::fmt;

/// The error type returned by httpmeter's fallible operations.
///
/// Application-level failures (404, 500, etc.) are HTTP responses, and the
/// middleware records them as ordinary data. This type surfaces the failures
/// that happen around the request path: binding a port, accepting a
/// connection, or creating and registering the metric collectors.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Metrics(prometheus::Error),
}

impl Error {
    /// `true` when a collector with the same name is already registered.
    pub fn is_already_registered(&self) -> bool {
        matches!(self, Self::Metrics(prometheus::Error::AlreadyReg))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Metrics(e) => write!(f, "metrics: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Metrics(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Self::Metrics(e)
    }
}
