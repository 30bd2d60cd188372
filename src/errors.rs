//! Error types produced by the escaper.
//!
//! Errors detected while tracking context are [`ContextError`]s. They are stored in the error
//! [`Context`] and poison the stream: every later write returns the same error.
//!
//! [`Context`]: crate::Context

use std::io;
use thiserror::Error;

/// The class of a [`ContextError`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Literal markup is ambiguous or would be interpreted differently by different browsers.
    #[error("ambiguous HTML")]
    BadHtml,

    /// A value can't be proven safe in the current position.
    #[error("ambiguous context")]
    AmbiguousContext,

    /// A value follows an unfinished escape sequence in a JS or CSS string.
    #[error("unfinished escape sequence")]
    PartialEscape,

    /// A value follows an unfinished JS regexp character set.
    #[error("unfinished regexp character set")]
    PartialCharset,

    /// `/` appears where it could start either a regexp or a division.
    #[error("ambiguous `/`")]
    SlashAmbiguity,

    /// Unresolved trailing bytes outgrew the configured limit.
    #[error("blocked bytes buffer capacity exceeded")]
    BufferCapacityExceeded,
}

/// An error that put a [`Context`](crate::Context) into the error state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {description}")]
pub struct ContextError {
    kind: ErrorKind,
    description: String,
}

impl ContextError {
    #[inline]
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        ContextError {
            kind,
            description: description.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// An error that occurred while writing to an [`Escaper`](crate::Escaper).
#[derive(Error, Debug)]
pub enum EscapeError {
    /// The stream is in the error context. It stays there: every later write fails the same way.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The underlying sink failed. The output written so far is incomplete.
    #[error("failed to write to the output sink: {0}")]
    Io(#[from] io::Error),
}

impl EscapeError {
    /// Returns the context error, if the stream has been poisoned.
    #[inline]
    #[must_use]
    pub fn context_error(&self) -> Option<&ContextError> {
        match self {
            EscapeError::Context(err) => Some(err),
            EscapeError::Io(_) => None,
        }
    }
}
