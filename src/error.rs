//! Library error taxonomy.
//!
//! Every fallible operation in the crate reports through [`Error`]:
//!
//! - [`Error::Config`] — fatal scene-description problems (bad JSON, a
//!   validation rule violated).
//! - [`Error::Precondition`] — a degenerate argument that makes an
//!   operation ill-defined (a camera whose eye and target coincide,
//!   rendering a mesh before it has been initialised).
//! - [`Error::Resource`] — a missing file or GPU bring-up failure.
//! - [`Error::Io`] — an underlying I/O failure, carrying the path.

use thiserror::Error;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A fatal problem with a scene description.
    #[error("configuration error: {0}")]
    Config(String),

    /// An operation was invoked in a state that makes it ill-defined.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A resource could not be acquired (missing file, GPU bring-up).
    #[error("resource error: {0}")]
    Resource(String),

    /// An I/O failure, annotated with the offending path.
    #[error("i/o error for {path}: {source}")]
    Io {
        /// The path that was being accessed.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl Error {
    /// Builds an [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Builds an [`Error::Precondition`].
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition(message.into())
    }

    /// Builds an [`Error::Resource`].
    pub fn resource(message: impl Into<String>) -> Self {
        Error::Resource(message.into())
    }
}
