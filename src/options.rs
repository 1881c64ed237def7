//! Configuration options for transfers.
//!
//! This module provides [`TransferOptions`], the immutable flag set threaded
//! into every resolver and executor call, and [`Operation`] for choosing
//! between copy and move semantics.
//!
//! # Example
//!
//! ```
//! use objcp::{StorageClass, TransferOptions};
//!
//! let options = TransferOptions::default()
//!     .with_parallel(8)
//!     .with_parents()
//!     .with_if_size_differ()
//!     .with_storage_class(StorageClass::StandardIa);
//! assert!(options.parents);
//! ```

use crate::policy::OverwritePolicy;
use crate::storage::StorageClass;
use crate::transfer::CompletionRecord;
use std::fmt;
use std::sync::Arc;

/// Callback invoked once per completed (non-skipped) transfer.
pub type CompletionHandler = Arc<dyn Fn(&CompletionRecord) + Send + Sync>;

/// Copy or move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Leave the source in place
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "cp"))]
    Copy,
    /// Delete the source once the transfer succeeded
    #[cfg_attr(feature = "serde", serde(rename = "mv"))]
    Move,
}

impl Operation {
    /// Short label used in records and error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Copy => "cp",
            Self::Move => "mv",
        }
    }

    /// Whether the source is deleted after a successful transfer.
    #[must_use]
    pub fn deletes_source(self) -> bool {
        self == Self::Move
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options for one transfer batch.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `parallel` | 16 | Concurrent transfers |
/// | `no_clobber` | `false` | Skip any existing destination |
/// | `if_size_differ` | `false` | Skip destinations of equal size |
/// | `if_source_newer` | `false` | Skip destinations not older than the source |
/// | `recursive` | `false` | Descend into subdirectories/prefixes |
/// | `parents` | `false` | Keep the path below the enumeration root |
/// | `storage_class` | `None` | Backend default |
///
/// The three overwrite checks combine with OR: any enabled check that
/// matches skips the object.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct TransferOptions {
    /// Number of concurrent transfers (default: 16)
    pub parallel: usize,

    /// Never overwrite an existing destination
    pub no_clobber: bool,

    /// Overwrite only when sizes differ
    pub if_size_differ: bool,

    /// Overwrite only when the source is strictly newer
    pub if_source_newer: bool,

    /// List directories and prefixes recursively
    ///
    /// Local-to-remote transfers are always recursive.
    pub recursive: bool,

    /// Preserve the path relative to the enumeration root instead of
    /// flattening to base names
    pub parents: bool,

    /// Storage class for objects written to a remote backend
    pub storage_class: Option<StorageClass>,

    /// Callback for completion records (optional)
    ///
    /// Records are logged via tracing either way.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub on_complete: Option<CompletionHandler>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            parallel: 16,
            no_clobber: false,
            if_size_differ: false,
            if_source_newer: false,
            recursive: false,
            parents: false,
            storage_class: None,
            on_complete: None,
        }
    }
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("parallel", &self.parallel)
            .field("no_clobber", &self.no_clobber)
            .field("if_size_differ", &self.if_size_differ)
            .field("if_source_newer", &self.if_source_newer)
            .field("recursive", &self.recursive)
            .field("parents", &self.parents)
            .field("storage_class", &self.storage_class)
            .field("on_complete", &self.on_complete.as_ref().map(|_| ".."))
            .finish()
    }
}

impl TransferOptions {
    /// Set the number of concurrent transfers
    ///
    /// Value is clamped to at least 1 to prevent panics.
    #[must_use]
    pub fn with_parallel(mut self, n: usize) -> Self {
        self.parallel = n.max(1);
        self
    }

    /// Never overwrite existing destinations
    #[must_use]
    pub fn with_no_clobber(mut self) -> Self {
        self.no_clobber = true;
        self
    }

    /// Skip destinations whose size equals the source's
    #[must_use]
    pub fn with_if_size_differ(mut self) -> Self {
        self.if_size_differ = true;
        self
    }

    /// Skip destinations that are not older than the source
    #[must_use]
    pub fn with_if_source_newer(mut self) -> Self {
        self.if_source_newer = true;
        self
    }

    /// List recursively
    #[must_use]
    pub fn with_recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Preserve relative paths below the enumeration root
    #[must_use]
    pub fn with_parents(mut self) -> Self {
        self.parents = true;
        self
    }

    /// Set the storage class for written objects
    #[must_use]
    pub fn with_storage_class(mut self, class: StorageClass) -> Self {
        self.storage_class = Some(class);
        self
    }

    /// Set a completion handler
    #[must_use]
    pub fn with_on_complete<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CompletionRecord) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(handler));
        self
    }

    pub(crate) fn overwrite_policy(&self) -> OverwritePolicy {
        OverwritePolicy {
            no_clobber: self.no_clobber,
            if_size_differ: self.if_size_differ,
            if_source_newer: self.if_source_newer,
        }
    }

    pub(crate) fn complete(&self, record: &CompletionRecord) {
        tracing::info!(
            op = record.operation.label(),
            src = %record.source,
            dst = %record.destination,
            size = record.size,
            storage_class = record.storage_class.map(StorageClass::as_str),
            "transferred"
        );
        if let Some(handler) = &self.on_complete {
            handler(record);
        }
    }
}
