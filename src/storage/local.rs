//! Local filesystem backend.
//!
//! Writes go through a temp file in the destination directory followed by
//! an atomic rename, so a failed or interrupted write never leaves a partial
//! file behind.

use super::filter::KeyFilter;
use super::walk::WalkListing;
use super::{ListMode, Metadata, Object, ObjectStream, ObjectType, StorageClient};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::location::Location;
use filetime::{FileTime, set_file_times};
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// The local filesystem.
#[derive(Debug, Clone, Copy)]
pub struct LocalFs {
    preserve_timestamps: bool,
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFs {
    /// Filesystem client that preserves modification times on copy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preserve_timestamps: true,
        }
    }

    /// Let copies take the current time instead of the source's mtime.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }
}

/// Create `loc` and any missing parents.
///
/// Succeeds if the directory already exists, including when another task
/// created it concurrently.
///
/// # Errors
///
/// Returns [`Error::DestinationNotDirectory`] if something other than a
/// directory already occupies the path, or the IO error otherwise.
pub fn ensure_dir(loc: &Location) -> Result<()> {
    let path = loc.local_path();
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) => match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(Error::DestinationNotDirectory(loc.clone())),
            Err(_) => Err(e.into()),
        },
    }
}

/// Map a missing-file IO error to the not-found sentinel.
pub(crate) fn not_found_as(loc: &Location, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::NotFound(loc.clone())
    } else {
        Error::Io(e)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Fill a temp file next to `dst`, then move it into place.
///
/// If `fill` fails the temp file is removed and `dst` is left untouched.
pub(crate) fn write_atomic_with<F>(dst: &Path, fill: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> Result<u64>,
{
    let parent = parent_dir(dst);
    fs::create_dir_all(parent)?;
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    let bytes = fill(temp_file.as_file_mut())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(dst).map_err(|e| e.error)?;
    Ok(bytes)
}

/// Stream `source` into `dst` through a temp file in the same directory.
pub(crate) fn write_atomic(source: &mut dyn Read, dst: &Path) -> Result<u64> {
    write_atomic_with(dst, |file| Ok(io::copy(source, file)?))
}

/// Copy `src` to `dst` atomically, creating missing parent directories.
pub(crate) fn copy_atomic(src: &Path, dst: &Path, preserve_timestamps: bool) -> io::Result<u64> {
    let src_meta = fs::metadata(src)?;
    if src_meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("{} is a directory", src.display()),
        ));
    }

    let parent = parent_dir(dst);
    fs::create_dir_all(parent)?;

    let src_file = File::open(src)?;
    let temp_file = tempfile::NamedTempFile::new_in(parent)?;
    let bytes = copy_file_contents(&src_file, temp_file.as_file(), src_meta.len())?;
    temp_file.as_file().sync_all()?;
    fs::set_permissions(temp_file.path(), src_meta.permissions())?;
    temp_file.persist(dst).map_err(|e| e.error)?;

    if preserve_timestamps {
        // Timestamp errors are not fatal for the copy itself
        let mtime = FileTime::from_last_modification_time(&src_meta);
        let atime = FileTime::from_last_access_time(&src_meta);
        let _ = set_file_times(dst, atime, mtime);
    }

    Ok(bytes)
}

/// Efficiently copy file contents using the best available method.
///
/// On Linux 4.5+, uses `copy_file_range` for zero-copy kernel-to-kernel transfer.
/// Falls back to `std::io::copy` on other platforms or on error.
fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = len;
        io::copy(&mut BufReader::new(src), &mut &*dst)
    }
}

#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    let src_fd = src.as_raw_fd();
    let dst_fd = dst.as_raw_fd();
    let mut remaining = len;
    let mut copied: u64 = 0;

    while remaining > 0 {
        let chunk_size = remaining.min(128 * 1024 * 1024) as usize;

        // SAFETY: both descriptors are open for the lifetime of the borrowed files;
        // null offsets use and advance the current file positions.
        let result = unsafe {
            libc::copy_file_range(
                src_fd,
                std::ptr::null_mut(),
                dst_fd,
                std::ptr::null_mut(),
                chunk_size,
                0,
            )
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            if copied == 0
                && matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
                )
            {
                return io::copy(&mut BufReader::new(src), &mut &*dst);
            }
            return Err(err);
        }

        if result == 0 {
            // Source shrank underneath us
            break;
        }

        let bytes = result as u64;
        copied += bytes;
        remaining = remaining.saturating_sub(bytes);
    }

    Ok(copied)
}

impl StorageClient for LocalFs {
    fn stat(&self, ctx: &Context, loc: &Location) -> Result<Object> {
        ctx.check()?;
        let meta = fs::metadata(loc.local_path()).map_err(|e| not_found_as(loc, e))?;
        let mut obj = Object::file(loc.clone(), meta.len(), meta.modified().ok());
        if meta.is_dir() {
            obj.kind = ObjectType::Directory;
        }
        Ok(obj)
    }

    fn list(&self, ctx: &Context, loc: &Location, recursive: bool, mode: ListMode) -> ObjectStream {
        let filter = match KeyFilter::new(loc.path(), recursive, mode) {
            Ok(filter) => filter,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        let walk_root = if loc.has_glob() {
            match filter.root() {
                "" => PathBuf::from("."),
                root => PathBuf::from(root),
            }
        } else {
            loc.local_path().to_path_buf()
        };
        Box::new(WalkListing::new(ctx, loc, walk_root, filter))
    }

    fn get(&self, ctx: &Context, loc: &Location, sink: &mut dyn Write) -> Result<u64> {
        ctx.check()?;
        let file = File::open(loc.local_path()).map_err(|e| not_found_as(loc, e))?;
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
        tracing::trace!(dst = %loc, ?metadata, "local put ignores object metadata");
        write_atomic(source, loc.local_path())?;
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
        copy_atomic(src.local_path(), dst.local_path(), self.preserve_timestamps)
            .map_err(|e| not_found_as(src, e))?;
        Ok(())
    }

    fn delete(&self, ctx: &Context, loc: &Location) -> Result<()> {
        ctx.check()?;
        fs::remove_file(loc.local_path()).map_err(|e| not_found_as(loc, e))
    }
}
