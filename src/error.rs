//! Defining the errors the compiler can produce.

use thiserror::Error;

use crate::sir::loc::SourceLocation;

/// Result type of the whole crate.
pub type Result<T> = std::result::Result<T, self::Error>;

/// Any error the compiler can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// The stencil description breaks a semantic rule.
    #[error("semantic error at {loc}: {message}")]
    Semantic {
        /// What went wrong.
        message: String,
        /// Location of the offending node.
        loc: SourceLocation,
    },
    /// A construct no pass or backend handles yet.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// The lowered tree is in no state to generate code from.
    #[error("code generation error: {0}")]
    CodeGen(String),
    /// JSON import or export failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// An I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a semantic error located at `loc`.
    pub fn semantic(message: impl ToString, loc: SourceLocation) -> Self {
        Self::Semantic {
            message: message.to_string(),
            loc,
        }
    }
}
