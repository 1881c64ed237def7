//! Destination resolution for one matched object.
//!
//! `listed` is true when the batch source stood for many objects (a glob or
//! a directory). In that case the destination is always a directory or
//! prefix that object names are appended to.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::location::Location;
use crate::storage::{Object, StorageClient, ensure_dir};

/// Name of `src` under the destination: its base name, or its path below
/// the enumeration root when `parents` is set.
pub(crate) fn object_name(src: &Location, parents: bool) -> String {
    if parents { src.relative() } else { src.base() }
}

/// Look up `loc`, mapping not-found to `None`.
fn stat_existing(ctx: &Context, client: &dyn StorageClient, loc: &Location) -> Result<Option<Object>> {
    match client.stat(ctx, loc) {
        Ok(obj) => Ok(Some(obj)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Destination for local-to-local and remote-to-remote copies.
///
/// A single object normally goes to the destination exactly as given. The
/// one exception is local: an existing directory, or a missing path ending
/// in `/`, receives the object under its base name, the way `cp` treats a
/// directory operand. Remote keys have no such exception.
///
/// # Errors
///
/// Returns [`Error::DestinationNotDirectory`] when a listed source meets an
/// existing non-directory destination, or any lookup failure other than
/// not-found.
pub(crate) fn resolve_copy_destination(
    ctx: &Context,
    dst_client: &dyn StorageClient,
    src: &Location,
    dst: &Location,
    listed: bool,
    parents: bool,
) -> Result<Location> {
    let objname = object_name(src, parents);

    if dst.is_remote() {
        if dst.ends_with_separator() {
            return Ok(dst.join(&objname));
        }
        if !listed {
            return Ok(dst.clone());
        }
        // Keys are flat: any existing object at `dst` is a non-directory.
        return match stat_existing(ctx, dst_client, dst)? {
            Some(_) => Err(Error::DestinationNotDirectory(dst.clone())),
            None => Ok(dst.join(&objname)),
        };
    }

    let existing = stat_existing(ctx, dst_client, dst)?;
    if !listed {
        // A single object lands inside an existing directory, otherwise at
        // the literal path; the copy creates missing parents.
        return match existing {
            Some(obj) if obj.is_dir() => Ok(dst.join(&objname)),
            None if dst.ends_with_separator() => Ok(dst.join(&objname)),
            _ => Ok(dst.clone()),
        };
    }

    match existing {
        Some(obj) if !obj.is_dir() => Err(Error::DestinationNotDirectory(dst.clone())),
        _ => Ok(dst.join(&objname)),
    }
}

/// Destination for remote-to-local downloads.
///
/// Creates the directories the download needs.
///
/// # Errors
///
/// Returns [`Error::DestinationNotDirectory`] when a listed source or
/// `parents` meets an existing non-directory destination, or any lookup or
/// directory creation failure.
pub(crate) fn resolve_download_destination(
    ctx: &Context,
    dst_client: &dyn StorageClient,
    src: &Location,
    dst: &Location,
    listed: bool,
    parents: bool,
) -> Result<Location> {
    let objname = object_name(src, parents);

    if listed {
        ensure_dir(dst)?;
    }

    let existing = stat_existing(ctx, dst_client, dst)?;

    if parents {
        if existing.as_ref().is_some_and(|obj| !obj.is_dir()) {
            return Err(Error::DestinationNotDirectory(dst.clone()));
        }
        let target = dst.join(&objname);
        ensure_dir(&target.parent())?;
        return Ok(target);
    }

    match existing {
        None if dst.ends_with_separator() => {
            let target = dst.join(&objname);
            ensure_dir(&target.parent())?;
            Ok(target)
        }
        None => {
            ensure_dir(&dst.parent())?;
            Ok(dst.clone())
        }
        Some(obj) if obj.is_dir() => Ok(dst.join(&objname)),
        Some(_) => Ok(dst.clone()),
    }
}

/// Destination for local-to-remote uploads.
///
/// The destination is always a prefix: the object name is appended even
/// without a trailing `/`.
pub(crate) fn resolve_upload_destination(src: &Location, dst: &Location, parents: bool) -> Location {
    dst.join(&object_name(src, parents))
}
