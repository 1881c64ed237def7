//! Object store emulated over a directory tree.
//!
//! Object `s3://bucket/key` is stored at `<root>/bucket/key`. Object
//! metadata (storage class, content type) is accepted and dropped.

use super::filter::KeyFilter;
use super::local::{copy_atomic, not_found_as, write_atomic};
use super::walk::WalkListing;
use super::{ListMode, Metadata, Object, ObjectStream, StorageClient};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::location::Location;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// A remote backend whose buckets are directories under `root`.
#[derive(Debug, Clone)]
pub struct DirObjectStore {
    root: PathBuf,
}

impl DirObjectStore {
    /// Serve buckets from subdirectories of `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding all buckets.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, loc: &Location) -> PathBuf {
        self.root.join(loc.bucket())
    }

    fn object_path(&self, loc: &Location) -> PathBuf {
        let mut path = self.bucket_dir(loc);
        path.extend(loc.path().split('/').filter(|s| !s.is_empty()));
        path
    }

    /// Remove directories left empty by a delete, stopping at the bucket.
    fn prune_empty_parents(&self, loc: &Location, path: &Path) {
        let bucket = self.bucket_dir(loc);
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == bucket || !dir.starts_with(&bucket) {
                break;
            }
            if fs::remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

impl StorageClient for DirObjectStore {
    fn stat(&self, ctx: &Context, loc: &Location) -> Result<Object> {
        ctx.check()?;
        let meta = fs::metadata(self.object_path(loc)).map_err(|e| not_found_as(loc, e))?;
        // Only exact keys exist; a directory is just a shared prefix.
        if meta.is_dir() || loc.path().ends_with('/') {
            return Err(Error::NotFound(loc.clone()));
        }
        Ok(Object::file(loc.clone(), meta.len(), meta.modified().ok()))
    }

    fn list(&self, ctx: &Context, loc: &Location, recursive: bool, mode: ListMode) -> ObjectStream {
        let filter = match KeyFilter::new(loc.path(), recursive, mode) {
            Ok(filter) => filter,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        let mut walk_root = self.bucket_dir(loc);
        walk_root.extend(filter.root().split('/').filter(|s| !s.is_empty()));
        Box::new(WalkListing::new(ctx, loc, walk_root, filter))
    }

    fn get(&self, ctx: &Context, loc: &Location, sink: &mut dyn Write) -> Result<u64> {
        ctx.check()?;
        let path = self.object_path(loc);
        if path.is_dir() {
            return Err(Error::NotFound(loc.clone()));
        }
        let file = File::open(&path).map_err(|e| not_found_as(loc, e))?;
        Ok(io::copy(&mut BufReader::new(file), sink)?)
    }

    fn put(
        &self,
        ctx: &Context,
        source: &mut dyn Read,
        loc: &Location,
        metadata: &Metadata,
    ) -> Result<()> {
        ctx.check()?;
        tracing::trace!(dst = %loc, ?metadata, "directory store drops object metadata");
        write_atomic(source, &self.object_path(loc))?;
        Ok(())
    }

    fn copy(
        &self,
        ctx: &Context,
        src: &Location,
        dst: &Location,
        _metadata: &Metadata,
    ) -> Result<()> {
        ctx.check()?;
        // Server-side copies get a fresh modification time.
        copy_atomic(&self.object_path(src), &self.object_path(dst), false)
            .map_err(|e| not_found_as(src, e))?;
        Ok(())
    }

    fn delete(&self, ctx: &Context, loc: &Location) -> Result<()> {
        ctx.check()?;
        let path = self.object_path(loc);
        fs::remove_file(&path).map_err(|e| not_found_as(loc, e))?;
        self.prune_empty_parents(loc, &path);
        Ok(())
    }
}
