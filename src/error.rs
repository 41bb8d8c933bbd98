// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use std::{fmt, io};

use thiserror::Error;
use tokio_modbus::ExceptionCode;

use crate::Quantity;

/// Category of a rejected command line argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Unrecognized keyword or malformed literal.
    Syntax,
    /// A token or the value list exceeds a fixed capacity.
    Length,
    /// A numeric literal lies outside the domain of its field.
    Range,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("Syntax error"),
            Self::Length => f.write_str("Length exception"),
            Self::Range => f.write_str("Range exception"),
        }
    }
}

/// A command line argument that the parser refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{classification} in argument '{token}'")]
pub struct Rejection {
    classification: Classification,
    token: String,
}

impl Rejection {
    pub(crate) fn new(classification: Classification, token: &[u8]) -> Self {
        Self {
            classification,
            token: String::from_utf8_lossy(token).into_owned(),
        }
    }

    #[must_use]
    pub const fn classification(&self) -> Classification {
        self.classification
    }

    /// The raw text of the offending argument.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// The reason why a command could not be finalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incomplete {
    #[error("no connection given (tcp or rtu)")]
    Connection,

    /// The last argument started a construct that still awaits more input.
    #[error("missing {0}")]
    Pending(&'static str),

    #[error("no action given")]
    Action,

    #[error("no address given (-a)")]
    Address,

    #[error("no count given (-c)")]
    Count,

    #[error("expected {expected} value(s) to write, got {actual}")]
    Values { expected: Quantity, actual: usize },
}

/// _moddiag_ error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was refused while parsing.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// All arguments were accepted but the command is not complete.
    #[error("Incomplete command: {0}")]
    Incomplete(#[from] Incomplete),

    /// Establishing the connection failed.
    #[error("Connection failed: {0}")]
    Connection(#[source] io::Error),

    /// The request/response exchange failed.
    #[error(transparent)]
    Transport(#[from] tokio_modbus::Error),

    /// The server responded with a _Modbus_ exception.
    #[error("Modbus exception: {0:?}")]
    Exception(ExceptionCode),

    /// Writing the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ExceptionCode> for Error {
    fn from(from: ExceptionCode) -> Self {
        Self::Exception(from)
    }
}

/// Specialized [`std::result::Result`] type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rejection() {
        let rejection = Rejection::new(Classification::Range, b"-a0x10000");
        assert_eq!(
            rejection.to_string(),
            "Range exception in argument '-a0x10000'"
        );
        assert_eq!(rejection.token(), "-a0x10000");
        assert_eq!(rejection.classification(), Classification::Range);
    }

    #[test]
    fn rejection_of_invalid_utf8() {
        let rejection = Rejection::new(Classification::Syntax, b"\xff");
        assert_eq!(rejection.token(), "\u{fffd}");
    }

    #[test]
    fn display_incomplete() {
        let err = Error::from(Incomplete::Values {
            expected: 3,
            actual: 2,
        });
        assert_eq!(
            err.to_string(),
            "Incomplete command: expected 3 value(s) to write, got 2"
        );
    }
}
