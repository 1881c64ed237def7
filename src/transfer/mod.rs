//! Batch transfers.
//!
//! A batch expands its source into objects, resolves a destination for each,
//! gates it through the overwrite policy and moves the data, with at most
//! `parallel` objects in flight. Per-object failures are collected, never
//! fatal to the batch.

mod content_type;
mod dispatch;
mod task;

use crate::context::Context;
use crate::error::{BatchError, Error, Result};
use crate::expand::expand;
use crate::location::{Location, LocationKind};
use crate::options::{Operation, TransferOptions};
use crate::storage::{Clients, StorageClass};
use dispatch::Dispatcher;
use task::TaskEnv;

/// The four valid pairings of source and destination kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Filesystem to filesystem
    LocalToLocal,
    /// Filesystem to object store (upload)
    LocalToRemote,
    /// Object store to filesystem (download)
    RemoteToLocal,
    /// Object store to object store
    RemoteToRemote,
}

impl Route {
    /// Route for a source/destination pair.
    #[must_use]
    pub fn between(src: &Location, dst: &Location) -> Self {
        match (src.kind(), dst.kind()) {
            (LocationKind::Local, LocationKind::Local) => Self::LocalToLocal,
            (LocationKind::Local, LocationKind::Remote) => Self::LocalToRemote,
            (LocationKind::Remote, LocationKind::Local) => Self::RemoteToLocal,
            (LocationKind::Remote, LocationKind::Remote) => Self::RemoteToRemote,
        }
    }
}

/// Parameters of one batch.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Source pattern, possibly a glob or a directory
    pub source: Location,
    /// Destination; never a glob
    pub destination: Location,
    /// Copy or move
    pub operation: Operation,
    /// Flags and concurrency
    pub options: TransferOptions,
}

impl TransferRequest {
    /// A copy with default options.
    #[must_use]
    pub fn new(source: Location, destination: Location) -> Self {
        Self {
            source,
            destination,
            operation: Operation::Copy,
            options: TransferOptions::default(),
        }
    }

    /// Set copy or move.
    #[must_use]
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }
}

/// One successful, non-skipped transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CompletionRecord {
    /// Copy or move
    pub operation: Operation,
    /// Object that was read
    pub source: Location,
    /// Object that was written
    pub destination: Location,
    /// Size of the transferred object in bytes
    pub size: u64,
    /// Storage class applied, when known
    pub storage_class: Option<StorageClass>,
}

/// Counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchStats {
    /// Objects transferred
    pub transferred: u64,
    /// Objects left alone by the overwrite policy
    pub skipped: u64,
    /// Objects whose resolution or transfer failed
    pub failed: u64,
    /// Items the listing could not produce
    pub enumeration_errors: u64,
    /// Total size of transferred objects
    pub bytes: u64,
}

/// Run one batch.
///
/// Blocks until every dispatched object has been handled.
///
/// # Errors
///
/// Fails before any object is transferred with:
/// - [`Error::GlobInDestination`] if the destination contains glob characters
/// - [`Error::RemoteNotConfigured`] if a remote location has no client
/// - the lookup error of a local source that cannot be stat'ed
///
/// After the batch:
/// - [`Error::Cancelled`] if the context was cancelled
/// - [`Error::Batch`] listing every per-object failure
///
/// A source that matched nothing is not an error; it yields empty stats.
pub fn transfer(ctx: &Context, clients: &Clients, request: &TransferRequest) -> Result<BatchStats> {
    let TransferRequest {
        source,
        destination,
        operation,
        options,
    } = request;

    if destination.has_glob() {
        return Err(Error::GlobInDestination(destination.clone()));
    }
    let src_client = clients.for_location(source)?;
    clients.for_location(destination)?;

    let route = Route::between(source, destination);
    // Directory-tree uploads are always recursive.
    let recursive = options.recursive || route == Route::LocalToRemote;
    let expansion = expand(ctx, src_client, source, recursive)?;

    let env = TaskEnv {
        ctx,
        clients,
        operation: *operation,
        options,
        destination,
        listed: expansion.listed,
    };
    let aggregator = Dispatcher::new(options.parallel).run(&env, route, expansion.objects);
    let dispatched = aggregator.dispatched_count();
    let (stats, failures) = aggregator.drain();

    if ctx.is_cancelled() {
        tracing::warn!(
            transferred = stats.transferred,
            failed = stats.failed,
            "batch cancelled"
        );
        return Err(Error::Cancelled);
    }
    if !failures.is_empty() {
        return Err(BatchError { failures, stats }.into());
    }
    if dispatched == 0 {
        tracing::warn!(
            src = %source,
            enumeration_errors = stats.enumeration_errors,
            "no objects matched"
        );
    }
    Ok(stats)
}
