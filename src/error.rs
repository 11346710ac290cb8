//! Error types.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The cased text does not line up with the text characters of the markup.
///
/// Raised instead of truncating or padding, since either would silently
/// corrupt the output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cased text has {actual} characters but the markup holds {expected} text characters")]
pub struct AlignmentError {
    /// Number of characters outside tags in the markup.
    pub expected: usize,
    /// Number of characters in the cased text.
    pub actual: usize,
}

/// Failure while recasing one input unit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("titlecase oracle failed on {input:?}: {reason}")]
    Oracle { input: String, reason: String },

    #[error("titlecase oracle timed out after {timeout:?} on {input:?}")]
    OracleTimeout { input: String, timeout: Duration },

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn at_line(self, line: usize) -> Self {
        Error::Line {
            line,
            source: Box::new(self),
        }
    }
}
