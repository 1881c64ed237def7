//! Error types for objcp.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur while expanding, resolving and transferring objects, the
//! per-object [`TransferError`] wrapper, and the batch-level [`BatchError`].
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | IO | [`Error::Io`], [`Error::Walk`] |
//! | Usage | [`Error::GlobInDestination`], [`Error::InvalidLocation`], [`Error::InvalidPattern`], [`Error::InvalidStorageClass`], [`Error::RemoteNotConfigured`] |
//! | Lookup | [`Error::NotFound`] |
//! | Resolution | [`Error::DestinationNotDirectory`], [`Error::SameObject`] |
//! | Aggregate | [`Error::Batch`] |
//! | Control | [`Error::Cancelled`] |

use crate::location::Location;
use crate::transfer::BatchStats;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for objcp operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during transfer operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Directory traversal failed while listing a local location
    #[error("Failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The given object does not exist.
    ///
    /// Every resolution algorithm branches on this variant explicitly, so
    /// backends must return it (and nothing else) for a missing object.
    #[error("Given object not found: {0}")]
    NotFound(Location),

    /// A multi-object source was paired with a destination that exists but
    /// is not a directory
    #[error("Destination argument is expected to be a directory: {0}")]
    DestinationNotDirectory(Location),

    /// Source and resolved destination name the same object
    #[error("Source and destination are the same object: {0}")]
    SameObject(Location),

    /// Destination argument contains glob characters
    #[error("Target {0} can not contain glob characters")]
    GlobInDestination(Location),

    /// A path string could not be parsed into a location
    #[error("Invalid location {input:?}: {reason}")]
    InvalidLocation {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Glob pattern in a source location is malformed
    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    /// Unknown storage class name
    #[error("Unknown storage class: {0}")]
    InvalidStorageClass(String),

    /// A remote location was used but no remote storage client is configured
    #[error("No remote storage configured for {0}")]
    RemoteNotConfigured(Location),

    /// Operation was cancelled via the cancellation context
    #[error("Operation cancelled")]
    Cancelled,

    /// One or more objects in a batch failed
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl Error {
    /// Whether this is the "given object not found" sentinel.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Whether this error is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// A failure of a single object in a batch.
///
/// The underlying cause is always wrapped with the operation label and the
/// source/destination pair so that the aggregate report is self-describing.
#[derive(Error, Debug)]
#[error("{op} {src} {dst}: {source}")]
pub struct TransferError {
    /// Operation label (`cp`, `mv`)
    pub op: &'static str,
    /// Source object
    pub src: Location,
    /// Destination (as resolved so far)
    pub dst: Location,
    /// Underlying cause
    pub source: Box<Error>,
}

impl TransferError {
    pub(crate) fn new(op: &'static str, src: Location, dst: Location, source: Error) -> Self {
        Self {
            op,
            src,
            dst,
            source: Box::new(source),
        }
    }
}

/// The folded result of every failed task in one batch.
///
/// Returned inside [`Error::Batch`]. Order of failures follows completion
/// order, which is not deterministic.
#[derive(Debug)]
pub struct BatchError {
    /// Every per-object failure
    pub failures: Vec<TransferError>,
    /// Statistics for the whole batch, including the successes
    pub stats: BatchStats,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.failures.len();
        write!(
            f,
            "{} error{} occurred:",
            n,
            if n == 1 { "" } else { "s" }
        )?;
        for failure in &self.failures {
            write!(f, "\n\t* {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}
