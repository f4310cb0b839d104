use std::io;
use thiserror::Error;

/// Failure classes for a single probe attempt. Each one ends the attempt at
/// the stage that raised it; none of them are fatal to the process.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("socket creation failed: {source}")]
    SocketCreation { source: io::Error },

    #[error("address resolution failed for {authority}: {source}")]
    AddressResolution { authority: String, source: io::Error },

    #[error("connection to {authority} failed: {source}")]
    Connection { authority: String, source: io::Error },

    #[error("socket error while connecting to {authority}: {source}")]
    GenericSocket { authority: String, source: io::Error },

    #[error("sending data failed after {sent} of {expected} bytes: {source}")]
    Send {
        sent: usize,
        expected: usize,
        source: io::Error,
    },

    #[error("receiving data failed: {source}")]
    Receive { source: io::Error },

    /// Raised by release, reported but never allowed to mask an earlier
    /// stage's outcome.
    #[error("closing socket failed: {source}")]
    Close { source: io::Error },

    #[error("unexpected error: {detail}")]
    Unexpected { detail: String },
}

/// The stage an attempt died in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    Connect,
    Send,
    Receive,
    Close,
}

impl ProbeError {
    pub fn stage(&self) -> Stage {
        match self {
            ProbeError::SocketCreation { .. } => Stage::Acquire,
            ProbeError::AddressResolution { .. }
            | ProbeError::Connection { .. }
            | ProbeError::GenericSocket { .. } => Stage::Connect,
            // out-of-sequence conditions surface at the send stage first
            ProbeError::Send { .. } | ProbeError::Unexpected { .. } => Stage::Send,
            ProbeError::Receive { .. } => Stage::Receive,
            ProbeError::Close { .. } => Stage::Close,
        }
    }

    pub(crate) fn unexpected(detail: impl Into<String>) -> ProbeError {
        ProbeError::Unexpected {
            detail: detail.into(),
        }
    }
}
