//! Overwrite policy: whether an existing destination may be replaced.

use crate::context::Context;
use crate::error::Result;
use crate::location::Location;
use crate::storage::{Clients, Object};
use std::fmt;

/// Why a transfer was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipReason {
    /// Destination exists and no-clobber is set
    NoClobber,
    /// Destination has the same size as the source
    SameSize,
    /// Destination is not older than the source
    NotNewer,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoClobber => "object already exists",
            Self::SameSize => "object size matches",
            Self::NotNewer => "object is newer or same age",
        })
    }
}

/// Outcome of an overwrite check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Go ahead with the transfer
    Proceed,
    /// Leave the destination untouched
    Skip(SkipReason),
}

/// The three overwrite checks. Any enabled check that matches skips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OverwritePolicy {
    pub no_clobber: bool,
    pub if_size_differ: bool,
    pub if_source_newer: bool,
}

impl OverwritePolicy {
    fn is_unconditional(self) -> bool {
        !(self.no_clobber || self.if_size_differ || self.if_source_newer)
    }

    /// Decide whether `src` may overwrite `dst`.
    ///
    /// A missing destination always proceeds.
    ///
    /// # Errors
    ///
    /// Propagates any lookup failure other than not-found.
    pub(crate) fn check(
        self,
        ctx: &Context,
        clients: &Clients,
        src: &Location,
        dst: &Location,
    ) -> Result<Decision> {
        if self.is_unconditional() {
            return Ok(Decision::Proceed);
        }

        let dst_obj = match clients.for_location(dst)?.stat(ctx, dst) {
            Ok(obj) => obj,
            Err(e) if e.is_not_found() => return Ok(Decision::Proceed),
            Err(e) => return Err(e),
        };

        if self.no_clobber {
            return Ok(Decision::Skip(SkipReason::NoClobber));
        }

        let src_obj = clients.for_location(src)?.stat(ctx, src)?;
        Ok(self.compare(&src_obj, &dst_obj))
    }

    fn compare(self, src: &Object, dst: &Object) -> Decision {
        if self.if_size_differ && src.size == dst.size {
            return Decision::Skip(SkipReason::SameSize);
        }
        if self.if_source_newer && !is_source_newer(src, dst) {
            return Decision::Skip(SkipReason::NotNewer);
        }
        Decision::Proceed
    }
}

/// Whether `src` was modified strictly after `dst`.
///
/// An unknown modification time on either side counts as newer, so the
/// transfer happens.
fn is_source_newer(src: &Object, dst: &Object) -> bool {
    match (src.modified, dst.modified) {
        (Some(src_mtime), Some(dst_mtime)) => src_mtime > dst_mtime,
        _ => true,
    }
}
