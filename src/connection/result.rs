//! Single-slot result cache
//!
//! A connection holds at most one pending parameter/command result. Each
//! cached result is reachable through a [`ResultToken`] tagged with the
//! owning connection and a per-connection generation, so a token can only
//! ever match the result it was issued for.
//!
//! Results are read-once: a successful retrieval consumes the result, and a
//! failed retrieval discards whatever was pending.

use crate::error::{Error, Result};
use crate::stream::ParameterBin;

use super::handle::ConnectionHandle;

/// Token identifying a single pending result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultToken {
    connection: ConnectionHandle,
    generation: u64,
}

impl ResultToken {
    /// Token returned when a request produced no result
    pub const NULL: ResultToken = ResultToken {
        connection: ConnectionHandle::from_raw(0),
        generation: 0,
    };

    /// Check if this is the null token
    pub fn is_null(&self) -> bool {
        self.generation == 0
    }

    /// Connection that issued the token
    pub fn connection(&self) -> ConnectionHandle {
        self.connection
    }

    /// Generation of the result within its connection
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for ResultToken {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for ResultToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}:{}", self.connection, self.generation)
        }
    }
}

/// Status reported by `get_result`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Result copied and consumed
    Success,
    /// Token was null, stale, duplicated or from another connection
    InvalidParameterToken,
}

impl Status {
    /// Check for success
    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }
}

#[derive(Debug)]
struct PendingResult {
    token: ResultToken,
    bin: ParameterBin,
}

/// Owned slot for the connection's pending result
#[derive(Debug)]
pub(crate) struct ResultSlot {
    owner: ConnectionHandle,
    last_generation: u64,
    pending: Option<PendingResult>,
}

impl ResultSlot {
    pub(crate) fn new(owner: ConnectionHandle) -> Self {
        Self {
            owner,
            last_generation: 0,
            pending: None,
        }
    }

    /// Replace the pending result
    ///
    /// Any previous result is discarded first. Returns the new result's
    /// length and token (0 and [`ResultToken::NULL`] when `result` is None).
    pub(crate) fn cache(&mut self, result: Option<ParameterBin>) -> (usize, ResultToken) {
        self.clear();

        match result {
            Some(bin) => {
                self.last_generation += 1;
                let token = ResultToken {
                    connection: self.owner,
                    generation: self.last_generation,
                };
                let len = bin.byte_length();
                self.pending = Some(PendingResult { token, bin });
                (len, token)
            }
            None => (0, ResultToken::NULL),
        }
    }

    /// Consume the pending result if `token` identifies it
    ///
    /// On mismatch the pending result is discarded as well.
    pub(crate) fn take(&mut self, token: ResultToken) -> Result<ParameterBin> {
        match self.pending.take() {
            Some(pending) if pending.token == token => Ok(pending.bin),
            Some(pending) => Err(Error::TokenMismatch {
                presented: token,
                pending: pending.token,
            }),
            None => Err(Error::NoPendingResult(token)),
        }
    }

    /// Discard the pending result, returning whether one existed
    pub(crate) fn clear(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn pending_token(&self) -> Option<ResultToken> {
        self.pending.as_ref().map(|p| p.token)
    }
}
