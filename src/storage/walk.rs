//! Lazy directory-tree listing shared by the filesystem-backed stores.

use super::filter::{KeyFilter, KeyMatch, Matcher};
use super::Object;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::location::Location;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walks `walk_root` depth-first and yields the entries whose keys match.
///
/// Keys are formed as `filter.root() + <path below walk_root>` with `/`
/// separators, so the same filter works for local paths and object keys.
pub(crate) struct WalkListing {
    ctx: Context,
    parent: Location,
    walk_root: PathBuf,
    walker: walkdir::IntoIter,
    matcher: Matcher,
    done: bool,
}

impl WalkListing {
    pub(crate) fn new(ctx: &Context, parent: &Location, walk_root: PathBuf, filter: KeyFilter) -> Self {
        let mut walker = WalkDir::new(&walk_root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name();
        if let Some(depth) = filter.max_depth() {
            walker = walker.max_depth(depth);
        }
        Self {
            ctx: ctx.clone(),
            parent: parent.clone(),
            walk_root,
            walker: walker.into_iter(),
            matcher: Matcher::new(filter),
            done: false,
        }
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.walk_root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Some(format!("{}{}", self.matcher.filter().root(), parts.join("/")))
    }

    fn directory(&self, key: String) -> Object {
        let relative = key[self.matcher.filter().root().len()..].to_owned();
        Object::directory(self.parent.object(key, relative))
    }
}

impl Iterator for WalkListing {
    type Item = Result<Object>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if self.ctx.is_cancelled() {
                self.done = true;
                return Some(Err(Error::Cancelled));
            }

            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    // The walk root itself is unreadable: nothing below it can match.
                    if e.depth() == 0 {
                        self.done = true;
                        if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) {
                            return Some(Err(Error::NotFound(self.parent.clone())));
                        }
                    }
                    return Some(Err(e.into()));
                }
            };

            let Some(key) = self.key_for(entry.path()) else {
                continue;
            };

            if entry.file_type().is_dir() {
                if let Some(KeyMatch::Prefix { key }) = self.matcher.dir(&key) {
                    return Some(Ok(self.directory(key)));
                }
                continue;
            }

            match self.matcher.object(&key) {
                Some(KeyMatch::Object { relative }) => {
                    let meta = match entry.metadata() {
                        Ok(meta) => meta,
                        Err(e) => return Some(Err(e.into())),
                    };
                    let location = self.parent.object(key, relative);
                    return Some(Ok(Object::file(location, meta.len(), meta.modified().ok())));
                }
                Some(KeyMatch::Prefix { key }) => return Some(Ok(self.directory(key))),
                None => {}
            }
        }
    }
}
