//! Typed source and destination locations.
//!
//! A [`Location`] is parsed once from a user-supplied string and used
//! read-only afterwards. Remote locations use the `s3://bucket/key` form;
//! every other string is a local filesystem path.
//!
//! # Example
//!
//! ```
//! use objcp::Location;
//!
//! let src = Location::parse("s3://bucket/logs/*.gz")?;
//! assert!(src.is_remote());
//! assert!(src.has_glob());
//!
//! let dst = Location::parse("backup/")?;
//! assert_eq!(dst.join("app.gz").to_string(), "backup/app.gz");
//! # Ok::<(), objcp::Error>(())
//! ```

use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Scheme prefix identifying a remote location.
pub const REMOTE_SCHEME: &str = "s3://";

const GLOB_CHARS: &[char] = &['*', '?', '['];

/// Returns true if `s` contains any glob metacharacter.
#[inline]
pub(crate) fn has_glob_chars(s: &str) -> bool {
    s.contains(GLOB_CHARS)
}

/// Whether a location lives on the local filesystem or in the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// Local filesystem path
    Local,
    /// Object store key (`s3://bucket/key`)
    Remote,
}

/// A parsed source or destination.
///
/// Two locations compare equal when kind, bucket and path match. The
/// enumeration-relative name attached by listing does not take part in
/// equality.
#[derive(Debug, Clone)]
pub struct Location {
    kind: LocationKind,
    bucket: String,
    path: String,
    glob: bool,
    relative: Option<String>,
}

impl Location {
    /// Parse a path string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] for an empty string, a remote
    /// location without a bucket, or a bucket name containing glob characters.
    pub fn parse(input: &str) -> Result<Self> {
        if let Some(rest) = input.strip_prefix(REMOTE_SCHEME) {
            let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
            if bucket.is_empty() {
                return Err(Error::InvalidLocation {
                    input: input.to_owned(),
                    reason: "missing bucket name",
                });
            }
            if has_glob_chars(bucket) {
                return Err(Error::InvalidLocation {
                    input: input.to_owned(),
                    reason: "bucket name can not contain glob characters",
                });
            }
            return Ok(Self::remote(bucket, key));
        }

        if input.is_empty() {
            return Err(Error::InvalidLocation {
                input: String::new(),
                reason: "empty path",
            });
        }
        Ok(Self::local(input))
    }

    /// Build a local location from a path string.
    pub fn local(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            kind: LocationKind::Local,
            bucket: String::new(),
            glob: has_glob_chars(&path),
            path,
            relative: None,
        }
    }

    /// Build a remote location from a bucket and key.
    pub fn remote(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let path = key.into();
        Self {
            kind: LocationKind::Remote,
            bucket: bucket.into(),
            glob: has_glob_chars(&path),
            path,
            relative: None,
        }
    }

    /// A concrete object found by listing under this location.
    ///
    /// The result never counts as a glob, even if the object name itself
    /// contains glob characters.
    pub(crate) fn object(&self, path: String, relative: String) -> Self {
        Self {
            kind: self.kind,
            bucket: self.bucket.clone(),
            path,
            glob: false,
            relative: Some(relative),
        }
    }

    /// Local or remote.
    #[must_use]
    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    /// Whether this is an object store location.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.kind == LocationKind::Remote
    }

    /// Whether the path contains glob characters.
    #[must_use]
    pub fn has_glob(&self) -> bool {
        self.glob
    }

    /// Bucket name; empty for local locations.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for remote locations, filesystem path for local ones.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Filesystem view of the path.
    #[must_use]
    pub fn local_path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Last path component, ignoring a trailing separator.
    #[must_use]
    pub fn base(&self) -> String {
        match self.kind {
            LocationKind::Local => self
                .local_path()
                .file_name()
                .map_or_else(|| self.path.clone(), |n| n.to_string_lossy().into_owned()),
            LocationKind::Remote => {
                let trimmed = self.path.trim_end_matches('/');
                trimmed.rsplit('/').next().unwrap_or(trimmed).to_owned()
            }
        }
    }

    /// Path relative to the enumeration root.
    ///
    /// Falls back to [`base`](Self::base) for locations that were not
    /// produced by listing.
    #[must_use]
    pub fn relative(&self) -> String {
        self.relative.clone().unwrap_or_else(|| self.base())
    }

    /// Append a child name.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let path = match self.kind {
            LocationKind::Local => self.local_path().join(name).to_string_lossy().into_owned(),
            LocationKind::Remote => {
                if self.path.is_empty() || self.path.ends_with('/') {
                    format!("{}{}", self.path, name)
                } else {
                    format!("{}/{}", self.path, name)
                }
            }
        };
        Self {
            kind: self.kind,
            bucket: self.bucket.clone(),
            path,
            glob: false,
            relative: None,
        }
    }

    /// The directory containing this location.
    #[must_use]
    pub fn parent(&self) -> Self {
        let path = match self.kind {
            LocationKind::Local => match self.local_path().parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
                _ => ".".to_owned(),
            },
            LocationKind::Remote => {
                let trimmed = self.path.trim_end_matches('/');
                match trimmed.rfind('/') {
                    Some(idx) => trimmed[..=idx].to_owned(),
                    None => String::new(),
                }
            }
        };
        Self {
            kind: self.kind,
            bucket: self.bucket.clone(),
            path,
            glob: false,
            relative: None,
        }
    }

    /// Whether the path names a directory/prefix by ending in a separator.
    ///
    /// The root of a bucket always counts as a prefix.
    #[must_use]
    pub fn ends_with_separator(&self) -> bool {
        match self.kind {
            LocationKind::Local => {
                self.path.ends_with('/') || self.path.ends_with(std::path::MAIN_SEPARATOR)
            }
            LocationKind::Remote => self.path.is_empty() || self.path.ends_with('/'),
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.bucket == other.bucket && self.path == other.path
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.bucket.hash(state);
        self.path.hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocationKind::Local => f.write_str(&self.path),
            LocationKind::Remote => write!(f, "{}{}/{}", REMOTE_SCHEME, self.bucket, self.path),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
