//! Per-object transfer tasks.

use super::content_type::content_type_or_none;
use super::{CompletionRecord, Route};
use crate::context::Context;
use crate::error::{Error, Result, TransferError};
use crate::location::Location;
use crate::options::{Operation, TransferOptions};
use crate::policy::Decision;
use crate::resolve::{
    resolve_copy_destination, resolve_download_destination, resolve_upload_destination,
};
use crate::storage::{Clients, Metadata, Object, not_found_as, write_atomic_with};
use std::fs::File;

/// Everything a task needs that is shared across the batch.
pub(crate) struct TaskEnv<'a> {
    pub ctx: &'a Context,
    pub clients: &'a Clients,
    pub operation: Operation,
    pub options: &'a TransferOptions,
    /// The batch destination, before per-object resolution
    pub destination: &'a Location,
    /// Whether the source stood for many objects
    pub listed: bool,
}

impl TaskEnv<'_> {
    fn fail(&self, src: &Location, dst: &Location, e: Error) -> TransferError {
        TransferError::new(self.operation.label(), src.clone(), dst.clone(), e)
    }

    fn record(&self, src: Location, dst: Location, size: u64, obj: &Object) -> CompletionRecord {
        CompletionRecord {
            operation: self.operation,
            source: src,
            destination: dst,
            size,
            storage_class: self.options.storage_class.or(obj.storage_class),
        }
    }
}

/// Result of one task that did not fail.
#[derive(Debug)]
pub(crate) enum TaskOutcome {
    Transferred(CompletionRecord),
    Skipped,
}

/// One matched object paired with the batch destination.
///
/// The variant fixes how the data moves; the destination is resolved when
/// the task runs.
#[derive(Debug)]
pub(crate) enum TransferTask {
    /// Both ends on the same backend
    CopyInPlace { src: Object },
    /// Local file to remote object
    Upload { src: Object },
    /// Remote object to local file
    Download { src: Object },
}

impl TransferTask {
    pub(crate) fn new(route: Route, src: Object) -> Self {
        match route {
            Route::LocalToLocal | Route::RemoteToRemote => Self::CopyInPlace { src },
            Route::LocalToRemote => Self::Upload { src },
            Route::RemoteToLocal => Self::Download { src },
        }
    }

    /// Run the task. Every failure is wrapped with operation, source and
    /// destination.
    pub(crate) fn execute(self, env: &TaskEnv<'_>) -> std::result::Result<TaskOutcome, TransferError> {
        match self {
            Self::CopyInPlace { src } => copy_in_place(env, src),
            Self::Upload { src } => upload(env, src),
            Self::Download { src } => download(env, src),
        }
    }
}

/// Consult the overwrite policy; `true` means leave the destination alone.
fn should_skip(env: &TaskEnv<'_>, src: &Location, dst: &Location) -> Result<bool> {
    match env
        .options
        .overwrite_policy()
        .check(env.ctx, env.clients, src, dst)?
    {
        Decision::Proceed => Ok(false),
        Decision::Skip(reason) => {
            tracing::debug!(
                op = env.operation.label(),
                src = %src,
                dst = %dst,
                %reason,
                "skipped"
            );
            Ok(true)
        }
    }
}

fn copy_in_place(env: &TaskEnv<'_>, obj: Object) -> std::result::Result<TaskOutcome, TransferError> {
    let src = obj.location.clone();
    let unresolved = env.destination;

    let dst = env
        .clients
        .for_location(unresolved)
        .and_then(|client| {
            resolve_copy_destination(
                env.ctx,
                client,
                &src,
                unresolved,
                env.listed,
                env.options.parents,
            )
        })
        .map_err(|e| env.fail(&src, unresolved, e))?;
    // A move onto itself would delete the only copy.
    if dst == src {
        return Err(env.fail(&src, &dst, Error::SameObject(src.clone())));
    }

    let run = || -> Result<Option<u64>> {
        if should_skip(env, &src, &dst)? {
            return Ok(None);
        }
        let client = env.clients.for_location(&src)?;
        let metadata = Metadata {
            storage_class: env.options.storage_class,
            content_type: None,
        };
        client.copy(env.ctx, &src, &dst, &metadata)?;
        let size = client.stat(env.ctx, &dst).map_or(obj.size, |o| o.size);

        if env.operation.deletes_source() {
            client.delete(env.ctx, &src)?;
        }
        Ok(Some(size))
    };

    match run().map_err(|e| env.fail(&src, &dst, e))? {
        Some(size) => Ok(TaskOutcome::Transferred(env.record(src, dst, size, &obj))),
        None => Ok(TaskOutcome::Skipped),
    }
}

fn upload(env: &TaskEnv<'_>, obj: Object) -> std::result::Result<TaskOutcome, TransferError> {
    let src = obj.location.clone();
    let dst = resolve_upload_destination(&src, env.destination, env.options.parents);

    let run = || -> Result<Option<u64>> {
        if should_skip(env, &src, &dst)? {
            return Ok(None);
        }

        let mut file = File::open(src.local_path()).map_err(|e| not_found_as(&src, e))?;
        let metadata = Metadata {
            storage_class: env.options.storage_class,
            content_type: content_type_or_none(&mut file, src.local_path()),
        };
        env.clients
            .for_location(&dst)?
            .put(env.ctx, &mut file, &dst, &metadata)?;
        drop(file);

        // The size is only reported, so a failed lookup is not an error.
        let src_client = env.clients.for_location(&src)?;
        let size = src_client.stat(env.ctx, &src).map_or(0, |o| o.size);

        if env.operation.deletes_source() {
            src_client.delete(env.ctx, &src)?;
        }
        Ok(Some(size))
    };

    match run().map_err(|e| env.fail(&src, &dst, e))? {
        Some(size) => Ok(TaskOutcome::Transferred(env.record(src, dst, size, &obj))),
        None => Ok(TaskOutcome::Skipped),
    }
}

fn download(env: &TaskEnv<'_>, obj: Object) -> std::result::Result<TaskOutcome, TransferError> {
    let src = obj.location.clone();
    let unresolved = env.destination;

    let dst = env
        .clients
        .for_location(unresolved)
        .and_then(|client| {
            resolve_download_destination(
                env.ctx,
                client,
                &src,
                unresolved,
                env.listed,
                env.options.parents,
            )
        })
        .map_err(|e| env.fail(&src, unresolved, e))?;

    let run = || -> Result<Option<u64>> {
        if should_skip(env, &src, &dst)? {
            return Ok(None);
        }
        let src_client = env.clients.for_location(&src)?;

        // A failed get drops the temp file; the source stays untouched.
        let size = write_atomic_with(dst.local_path(), |file| {
            src_client.get(env.ctx, &src, file)
        })?;

        if env.operation.deletes_source() {
            src_client.delete(env.ctx, &src)?;
        }
        Ok(Some(size))
    };

    match run().map_err(|e| env.fail(&src, &dst, e))? {
        Some(size) => Ok(TaskOutcome::Transferred(env.record(src, dst, size, &obj))),
        None => Ok(TaskOutcome::Skipped),
    }
}
