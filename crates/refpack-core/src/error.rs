//! Error taxonomy for the resolution engine.
//!
//! Two layers:
//! - [`Error`] is the public, typed failure surface (fail-fast mode returns
//!   the first one as-is)
//! - [`ErrorRecord`] is the serializable diagnostic form collected in
//!   continue-on-error mode and raised together as an [`ErrorGroup`]

use serde::{Deserialize, Serialize};

use crate::refs::Refs;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source string could not be turned into a canonical location.
    #[error("Malformed location \"{location}\": {reason}")]
    InvalidLocation { location: String, reason: String },

    /// The `$ref` fragment is not valid pointer syntax.
    #[error("Invalid $ref pointer \"{pointer}\". Pointers must begin with \"#/\"")]
    InvalidPointer { pointer: String },

    /// A pointer token does not exist in the node it is applied to.
    #[error("Token \"{token}\" does not exist.")]
    MissingPointer { token: String },

    /// No registered reader claims this location.
    #[error("Could not find reader for \"{location}\"")]
    UnmatchedReader { location: String },

    /// No registered parser claims this document.
    #[error("Could not find parser for \"{location}\"")]
    UnmatchedParser { location: String },

    /// Every matching reader failed; wraps the last underlying failure.
    #[error("Error reading \"{location}\": {reason}")]
    Reader { location: String, reason: String },

    /// Every matching parser failed; wraps the last underlying failure.
    #[error("Error parsing \"{location}\": {reason}")]
    Parser { location: String, reason: String },

    /// A cycle was found while cycles are disallowed.
    #[error("Circular $ref pointer found at {pointer}")]
    CircularReference { pointer: String },

    /// One or more errors collected in continue-on-error mode.
    #[error(transparent)]
    Group(#[from] Box<ErrorGroup>),
}

impl Error {
    /// The machine-readable code used when this error becomes a record.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidLocation { .. } => ErrorCode::InvalidLocation,
            Error::InvalidPointer { .. } => ErrorCode::InvalidPointer,
            Error::MissingPointer { .. } => ErrorCode::MissingPointer,
            Error::UnmatchedReader { .. } => ErrorCode::UnmatchedReader,
            Error::UnmatchedParser { .. } => ErrorCode::UnmatchedParser,
            Error::Reader { .. } => ErrorCode::Reader,
            Error::Parser { .. } => ErrorCode::Parser,
            Error::CircularReference { .. } => ErrorCode::CircularReference,
            Error::Group(_) => ErrorCode::Group,
        }
    }
}

/// Stable, machine-readable error codes.
///
/// These are intended for programmatic handling (CI, tooling), while
/// `message` remains human-oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidLocation,
    InvalidPointer,
    MissingPointer,
    UnmatchedReader,
    UnmatchedParser,
    Reader,
    Parser,
    CircularReference,
    Group,
}

/// One collected failure: what went wrong, in which document, and at which
/// path inside that document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub message: String,
    /// Canonical location of the document the failure originated in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Unescaped path tokens within that document.
    pub path: Vec<String>,
}

impl ErrorRecord {
    pub fn new(error: &Error, source: Option<String>, path: Vec<String>) -> ErrorRecord {
        ErrorRecord {
            code: error.code(),
            message: error.to_string(),
            source,
            path,
        }
    }
}

/// The grouped failure raised at the end of a continue-on-error run.
///
/// Carries the ordered records plus the registry as it stood when the run
/// finished, so partially loaded state stays inspectable.
#[derive(Debug)]
pub struct ErrorGroup {
    /// Canonical location of the root document of the run.
    pub source: String,
    pub errors: Vec<ErrorRecord>,
    pub refs: Refs,
}

impl std::fmt::Display for ErrorGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.errors.len();
        let plural = if n == 1 { "error" } else { "errors" };
        write!(f, "{n} {plural} occurred while reading '{}'", self.source)
    }
}

impl std::error::Error for ErrorGroup {}

impl From<ErrorGroup> for Error {
    fn from(group: ErrorGroup) -> Error {
        Error::Group(Box::new(group))
    }
}
