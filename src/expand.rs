//! Source expansion: one source location into the objects to transfer.

use crate::context::Context;
use crate::error::Result;
use crate::location::Location;
use crate::storage::{ListMode, Object, ObjectStream, StorageClient};

/// The objects a source location stands for.
pub(crate) struct Expansion {
    /// Matched objects, directories included. `Err` items are enumeration
    /// errors.
    pub objects: ObjectStream,
    /// Whether the source stood for many objects (a glob or a directory).
    pub listed: bool,
}

/// Expand `src` into a lazy stream of objects.
///
/// A local source without glob characters is looked up first: a directory
/// is listed, a file is emitted as is. Glob sources are always listed. A
/// remote source without glob characters is a single object and is not
/// looked up, so a missing key surfaces when it is transferred.
///
/// # Errors
///
/// Returns the lookup error for a local source that cannot be stat'ed.
pub(crate) fn expand(
    ctx: &Context,
    client: &dyn StorageClient,
    src: &Location,
    recursive: bool,
) -> Result<Expansion> {
    let mut is_dir = false;
    if !src.has_glob() && !src.is_remote() {
        is_dir = client.stat(ctx, src)?.is_dir();
    }

    if src.has_glob() || is_dir {
        return Ok(Expansion {
            objects: client.list(ctx, src, recursive, ListMode::AllItems),
            listed: true,
        });
    }

    let single = Object::file(src.clone(), 0, None);
    Ok(Expansion {
        objects: Box::new(std::iter::once(Ok(single))),
        listed: false,
    })
}
