//! Builder API for ergonomic transfers.
//!
//! The builder pattern provides a fluent interface for configuring and
//! executing a batch. This is often more convenient than assembling a
//! [`TransferRequest`] by hand.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use objcp::{Clients, TransferBuilder};
//!
//! // Copy a directory tree with defaults
//! let stats = TransferBuilder::new("src", "dst").run(&Clients::local_only())?;
//! println!("Transferred {} objects", stats.transferred);
//! # Ok::<(), objcp::Error>(())
//! ```
//!
//! ## Download With Options
//!
//! ```no_run
//! use objcp::{Clients, DirObjectStore, TransferBuilder};
//! use std::sync::Arc;
//!
//! let clients = Clients::new(Arc::new(DirObjectStore::new("/srv/objects")));
//! let stats = TransferBuilder::new("s3://logs/2024/*.gz", "archive/")
//!     .parents()
//!     .if_source_newer()
//!     .parallel(8)
//!     .run(&clients)?;
//!
//! if stats.skipped > 0 {
//!     println!("Skipped {} up-to-date objects", stats.skipped);
//! }
//! # Ok::<(), objcp::Error>(())
//! ```

use crate::context::Context;
use crate::error::Result;
use crate::location::Location;
use crate::options::{Operation, TransferOptions};
use crate::storage::{Clients, StorageClass};
use crate::transfer::{BatchStats, CompletionRecord, TransferRequest, transfer};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// A builder for configuring and executing one batch.
///
/// Source and destination are parsed when [`run`](Self::run) is called, so
/// a malformed location surfaces as the run's error.
///
/// # Example
///
/// ```no_run
/// use objcp::{Clients, MemoryStore, TransferBuilder};
/// use std::sync::Arc;
///
/// let clients = Clients::new(Arc::new(MemoryStore::new()));
/// let stats = TransferBuilder::new("s3://bucket/in/*", "s3://bucket/out/")
///     .move_source()
///     .run(&clients)?;
/// # Ok::<(), objcp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TransferBuilder {
    src: String,
    dst: String,
    operation: Operation,
    options: TransferOptions,
    ctx: Context,
}

impl TransferBuilder {
    /// Create a new `TransferBuilder` copying `src` to `dst`.
    ///
    /// Uses default options (parallel=16, always overwrite).
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            operation: Operation::Copy,
            options: TransferOptions::default(),
            ctx: Context::new(),
        }
    }

    /// Set the number of concurrent transfers.
    ///
    /// Default is 16. Set to 1 for sequential transfers.
    #[must_use]
    pub fn parallel(mut self, n: usize) -> Self {
        self.options = self.options.with_parallel(n);
        self
    }

    /// Delete each source object after it was transferred.
    #[must_use]
    pub fn move_source(mut self) -> Self {
        self.operation = Operation::Move;
        self
    }

    /// Never overwrite an existing destination.
    #[must_use]
    pub fn no_clobber(mut self) -> Self {
        self.options = self.options.with_no_clobber();
        self
    }

    /// Overwrite only destinations whose size differs.
    #[must_use]
    pub fn if_size_differ(mut self) -> Self {
        self.options = self.options.with_if_size_differ();
        self
    }

    /// Overwrite only destinations older than the source.
    #[must_use]
    pub fn if_source_newer(mut self) -> Self {
        self.options = self.options.with_if_source_newer();
        self
    }

    /// Descend into subdirectories and prefixes.
    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.options = self.options.with_recursive();
        self
    }

    /// Keep each object's path below the enumeration root.
    #[must_use]
    pub fn parents(mut self) -> Self {
        self.options = self.options.with_parents();
        self
    }

    /// Storage class for objects written to the object store.
    #[must_use]
    pub fn storage_class(mut self, class: StorageClass) -> Self {
        self.options = self.options.with_storage_class(class);
        self
    }

    /// Set a cancellation token for cooperative cancellation.
    ///
    /// When the token is set to `true`, backend calls start failing with
    /// [`Error::Cancelled`](crate::Error::Cancelled) and the run returns
    /// that error once in-flight tasks have drained.
    #[must_use]
    pub fn cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.ctx = Context::with_cancel_token(token);
        self
    }

    /// Call `handler` for every completed transfer.
    #[must_use]
    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CompletionRecord) + Send + Sync + 'static,
    {
        self.options = self.options.with_on_complete(handler);
        self
    }

    /// Get the current options.
    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// Execute the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if either location is malformed, or any error of
    /// [`transfer`](crate::transfer()).
    pub fn run(self, clients: &Clients) -> Result<BatchStats> {
        let request = TransferRequest {
            source: Location::parse(&self.src)?,
            destination: Location::parse(&self.dst)?,
            operation: self.operation,
            options: self.options,
        };
        transfer(&self.ctx, clients, &request)
    }
}
