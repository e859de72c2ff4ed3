//! Error types
//!
//! Errors surfaced by the result-token protocol. Everything here is local and
//! recoverable; nothing in a connection is fatal to the process.

use crate::connection::{ResultToken, Status};

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for connection operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A token was presented while no result was pending
    NoPendingResult(ResultToken),
    /// The presented token does not identify the pending result
    TokenMismatch {
        presented: ResultToken,
        pending: ResultToken,
    },
}

impl Error {
    /// The token the client presented
    pub fn presented_token(&self) -> ResultToken {
        match self {
            Error::NoPendingResult(token) => *token,
            Error::TokenMismatch { presented, .. } => *presented,
        }
    }

    /// Status code reported to clients for this error
    pub fn status(&self) -> Status {
        match self {
            Error::NoPendingResult(_) | Error::TokenMismatch { .. } => {
                Status::InvalidParameterToken
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NoPendingResult(token) => write!(f, "No pending result for token {}", token),
            Error::TokenMismatch { presented, pending } => {
                write!(f, "Token mismatch: presented {}, pending {}", presented, pending)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        err.status()
    }
}
