//! Storage client capability and the backends shipped with objcp.
//!
//! Every backend implements [`StorageClient`]. The transfer core never
//! touches a backend directly; it asks [`Clients`] for the client that
//! serves a [`Location`]'s kind.
//!
//! | Backend | Kind | Notes |
//! |---------|------|-------|
//! | [`LocalFs`] | local | atomic writes, zero-copy on Linux |
//! | [`MemoryStore`] | remote | in-process, for embedding and tests |
//! | [`DirObjectStore`] | remote | object store emulated over a directory tree |

mod dir;
mod filter;
mod local;
mod memory;
mod walk;

pub use dir::DirObjectStore;
pub use local::{LocalFs, ensure_dir};
pub(crate) use local::{not_found_as, write_atomic_with};
pub use memory::MemoryStore;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::location::{Location, LocationKind};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

/// Lazy stream of listed objects. `Err` items are per-item enumeration
/// errors; the stream continues after them.
pub type ObjectStream = Box<dyn Iterator<Item = Result<Object>> + Send>;

/// File-like object or directory (common prefix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// Regular object
    File,
    /// Directory or common prefix
    Directory,
}

impl ObjectType {
    /// Whether this is a directory.
    #[must_use]
    pub fn is_dir(self) -> bool {
        self == ObjectType::Directory
    }
}

/// Object information returned by `stat` and `list`.
#[derive(Debug, Clone)]
pub struct Object {
    /// Where the object lives
    pub location: Location,
    /// File or directory
    pub kind: ObjectType,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, when the backend knows it
    pub modified: Option<SystemTime>,
    /// Storage class, when the backend records one
    pub storage_class: Option<StorageClass>,
}

impl Object {
    /// A regular object.
    #[must_use]
    pub fn file(location: Location, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            location,
            kind: ObjectType::File,
            size,
            modified,
            storage_class: None,
        }
    }

    /// A directory entry.
    #[must_use]
    pub fn directory(location: Location) -> Self {
        Self {
            location,
            kind: ObjectType::Directory,
            size: 0,
            modified: None,
            storage_class: None,
        }
    }

    /// Whether this is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Object storage class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StorageClass {
    /// `STANDARD`
    Standard,
    /// `REDUCED_REDUNDANCY`
    ReducedRedundancy,
    /// `STANDARD_IA`
    StandardIa,
    /// `ONEZONE_IA`
    OnezoneIa,
    /// `INTELLIGENT_TIERING`
    IntelligentTiering,
    /// `GLACIER`
    Glacier,
    /// `DEEP_ARCHIVE`
    DeepArchive,
}

impl StorageClass {
    /// Wire name of the class.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::ReducedRedundancy => "REDUCED_REDUNDANCY",
            Self::StandardIa => "STANDARD_IA",
            Self::OnezoneIa => "ONEZONE_IA",
            Self::IntelligentTiering => "INTELLIGENT_TIERING",
            Self::Glacier => "GLACIER",
            Self::DeepArchive => "DEEP_ARCHIVE",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(Self::Standard),
            "REDUCED_REDUNDANCY" | "RRS" => Ok(Self::ReducedRedundancy),
            "STANDARD_IA" => Ok(Self::StandardIa),
            "ONEZONE_IA" => Ok(Self::OnezoneIa),
            "INTELLIGENT_TIERING" => Ok(Self::IntelligentTiering),
            "GLACIER" => Ok(Self::Glacier),
            "DEEP_ARCHIVE" => Ok(Self::DeepArchive),
            _ => Err(Error::InvalidStorageClass(s.to_owned())),
        }
    }
}

/// Metadata attached to written objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Storage class for the new object
    pub storage_class: Option<StorageClass>,
    /// MIME type for the new object
    pub content_type: Option<String>,
}

/// What `list` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Objects and directories (common prefixes)
    #[default]
    AllItems,
    /// Objects only
    ObjectsOnly,
}

/// Operations a storage backend provides.
///
/// All calls take the batch [`Context`] first and fail with
/// [`Error::Cancelled`] once it is cancelled. A missing object must be
/// reported as [`Error::NotFound`].
pub trait StorageClient: Send + Sync + fmt::Debug {
    /// Look up a single object.
    fn stat(&self, ctx: &Context, loc: &Location) -> Result<Object>;

    /// List everything matching `loc` (a glob or a directory/prefix).
    fn list(&self, ctx: &Context, loc: &Location, recursive: bool, mode: ListMode) -> ObjectStream;

    /// Stream an object into `sink`, returning the bytes written.
    fn get(&self, ctx: &Context, loc: &Location, sink: &mut dyn Write) -> Result<u64>;

    /// Store the contents of `source` at `loc`.
    fn put(
        &self,
        ctx: &Context,
        source: &mut dyn Read,
        loc: &Location,
        metadata: &Metadata,
    ) -> Result<()>;

    /// Copy an object within this backend.
    fn copy(&self, ctx: &Context, src: &Location, dst: &Location, metadata: &Metadata)
    -> Result<()>;

    /// Remove an object.
    fn delete(&self, ctx: &Context, loc: &Location) -> Result<()>;
}

/// One storage client per location kind.
///
/// # Example
///
/// ```
/// use objcp::{Clients, Location, MemoryStore};
/// use std::sync::Arc;
///
/// let clients = Clients::new(Arc::new(MemoryStore::new()));
/// let loc = Location::parse("s3://bucket/key")?;
/// assert!(clients.for_location(&loc).is_ok());
/// # Ok::<(), objcp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Clients {
    local: Arc<dyn StorageClient>,
    remote: Option<Arc<dyn StorageClient>>,
}

impl Clients {
    /// Local filesystem plus the given remote backend.
    #[must_use]
    pub fn new(remote: Arc<dyn StorageClient>) -> Self {
        Self {
            local: Arc::new(LocalFs::new()),
            remote: Some(remote),
        }
    }

    /// Local filesystem only; remote locations are rejected.
    #[must_use]
    pub fn local_only() -> Self {
        Self {
            local: Arc::new(LocalFs::new()),
            remote: None,
        }
    }

    /// Replace the local backend.
    #[must_use]
    pub fn with_local(mut self, local: Arc<dyn StorageClient>) -> Self {
        self.local = local;
        self
    }

    /// The client serving `loc`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteNotConfigured`] for a remote location when no
    /// remote backend was supplied.
    pub fn for_location(&self, loc: &Location) -> Result<&dyn StorageClient> {
        match loc.kind() {
            LocationKind::Local => Ok(self.local.as_ref()),
            LocationKind::Remote => self
                .remote
                .as_deref()
                .ok_or_else(|| Error::RemoteNotConfigured(loc.clone())),
        }
    }
}
