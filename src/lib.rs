//! # objcp
//!
//! Parallel bulk copy and move between a local filesystem and an object store.
//!
//! ## Core Features
//!
//! - **Glob sources**: `s3://bucket/logs/*.gz` or `data/*.csv` patterns expand lazily
//! - **Four routes**: local↔local, local→remote, remote→local and remote↔remote
//! - **Parallel transfers**: Uses rayon with a bounded worker pool; work starts while listing
//! - **Partial failure**: Every matched object is attempted and every failure reported
//! - **Overwrite policy**: No-clobber, size and modification-time checks
//! - **Move semantics**: The source is deleted only after a confirmed transfer
//! - **Atomic writes**: Downloads and local copies go through temp file + rename
//! - **Cancellation**: A shared [`Context`] makes every backend call stop cooperatively
//!
//! ## Quick Start with Builder API
//!
//! The easiest way to use objcp is with the [`TransferBuilder`]:
//!
//! ```no_run
//! use objcp::{Clients, DirObjectStore, TransferBuilder};
//! use std::sync::Arc;
//!
//! let clients = Clients::new(Arc::new(DirObjectStore::new("/srv/objects")));
//! let stats = TransferBuilder::new("s3://bucket/reports/*.csv", "reports/")
//!     .parallel(8)
//!     .if_size_differ()
//!     .run(&clients)?;
//! println!("Transferred {} objects ({} bytes)", stats.transferred, stats.bytes);
//! # Ok::<(), objcp::Error>(())
//! ```
//!
//! ## Function API
//!
//! For more control, build a [`TransferRequest`] and call [`transfer()`]:
//!
//! ```
//! use objcp::{Clients, Context, Location, MemoryStore, Operation, TransferOptions,
//!             TransferRequest, transfer};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.insert("bucket", "in/a.txt", b"a".to_vec());
//! store.insert("bucket", "in/b.txt", b"b".to_vec());
//! let clients = Clients::new(store.clone());
//!
//! let request = TransferRequest::new(
//!     Location::parse("s3://bucket/in/*")?,
//!     Location::parse("s3://bucket/out/")?,
//! )
//! .with_operation(Operation::Move)
//! .with_options(TransferOptions::default().with_parallel(4));
//!
//! let stats = transfer(&Context::new(), &clients, &request)?;
//! assert_eq!(stats.transferred, 2);
//! assert_eq!(store.keys("bucket"), vec!["out/a.txt", "out/b.txt"]);
//! # Ok::<(), objcp::Error>(())
//! ```
//!
//! ## Destination Rules
//!
//! | Source | Destination | Result |
//! |--------|-------------|--------|
//! | remote object | remote key `k` | exactly `k` |
//! | local file | remote key `k` | `k/<name>` |
//! | single object | the source itself | [`Error::SameObject`] |
//! | anything | remote prefix `p/` | `p/<name>` |
//! | glob or directory | existing file | [`Error::DestinationNotDirectory`] |
//! | glob or directory | directory or prefix | `<dst>/<name>` |
//!
//! `<name>` is the base name, or the path below the glob root with `parents`.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialize/Deserialize for options, records and stats |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod context;
mod error;
mod expand;
mod location;
mod options;
mod policy;
mod resolve;
mod storage;
mod transfer;

pub use builder::TransferBuilder;
pub use context::Context;
pub use error::{BatchError, Error, Result, TransferError};
pub use location::{Location, LocationKind, REMOTE_SCHEME};
pub use options::{CompletionHandler, Operation, TransferOptions};
pub use storage::{
    Clients, DirObjectStore, ListMode, LocalFs, MemoryStore, Metadata, Object, ObjectStream,
    ObjectType, StorageClass, StorageClient, ensure_dir,
};
pub use transfer::{BatchStats, CompletionRecord, Route, TransferRequest, transfer};
