//! Error taxonomy for the book.

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

/// Errors the book can report back to a caller.
///
/// `InvariantViolation` is not meant to be handled — it signals a bug and is
/// only ever raised by `debug_assert!`-style checks, which abort in debug
/// builds before this variant would ever be constructed in practice.
pub enum BookError {
    /// A quote was malformed or conflicted with existing state
    /// (duplicate id, unknown id, zero/negative quantity or price,
    /// cancel/fill quantity exceeding the order's remaining quantity).
    InvalidInput {
        /// Human-readable explanation
        message: String,
    },

    /// An operation was attempted outside the trading phase that allows it.
    InvalidStatus {
        /// Human-readable explanation
        message: String,
    },

    /// The CSV replay loader failed to read or parse its input.
    IoError {
        /// Human-readable explanation
        message: String,
    },

    /// A structural invariant was violated. Indicates a bug in the engine.
    InvariantViolation {
        /// Human-readable explanation
        message: String,
    },
}

impl Display for BookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BookError::InvalidInput { message } => write!(f, "invalid input: {message}"),
            BookError::InvalidStatus { message } => write!(f, "invalid status: {message}"),
            BookError::IoError { message } => write!(f, "io error: {message}"),
            BookError::InvariantViolation { message } => {
                write!(f, "invariant violation: {message}")
            }
        }
    }
}

impl Debug for BookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl std::error::Error for BookError {}

impl BookError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        BookError::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_status(message: impl Into<String>) -> Self {
        BookError::InvalidStatus {
            message: message.into(),
        }
    }

    pub(crate) fn io(message: impl Into<String>) -> Self {
        BookError::IoError {
            message: message.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        BookError::InvariantViolation {
            message: message.into(),
        }
    }
}
