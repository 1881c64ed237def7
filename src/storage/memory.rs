//! In-process object store.

use super::filter::{KeyFilter, KeyMatch, Matcher};
use super::{ListMode, Metadata, Object, ObjectStream, StorageClient, StorageClass};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::location::Location;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    modified: SystemTime,
    storage_class: Option<StorageClass>,
    content_type: Option<String>,
}

/// A remote object store kept entirely in memory.
///
/// Keys are flat: "directories" exist only as common prefixes of keys.
///
/// # Example
///
/// ```
/// use objcp::{Context, Location, MemoryStore, StorageClient};
///
/// let store = MemoryStore::new();
/// store.insert("bucket", "docs/readme.md", b"# hi".to_vec());
///
/// let obj = store.stat(&Context::new(), &Location::parse("s3://bucket/docs/readme.md")?)?;
/// assert_eq!(obj.size, 4);
/// # Ok::<(), objcp::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<(String, String), StoredObject>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object stamped with the current time.
    pub fn insert(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.insert_with_mtime(bucket, key, data, SystemTime::now());
    }

    /// Store an object with an explicit modification time.
    pub fn insert_with_mtime(&self, bucket: &str, key: &str, data: Vec<u8>, modified: SystemTime) {
        let object = StoredObject {
            data,
            modified,
            storage_class: None,
            content_type: None,
        };
        self.write_map()
            .insert((bucket.to_owned(), key.to_owned()), object);
    }

    /// Contents of an object, if present.
    #[must_use]
    pub fn data(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lookup(bucket, key).map(|o| o.data)
    }

    /// Content type recorded for an object.
    #[must_use]
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.lookup(bucket, key).and_then(|o| o.content_type)
    }

    /// Storage class recorded for an object.
    #[must_use]
    pub fn storage_class(&self, bucket: &str, key: &str) -> Option<StorageClass> {
        self.lookup(bucket, key).and_then(|o| o.storage_class)
    }

    /// All keys in a bucket, sorted.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.read_map()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    fn lookup(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.read_map()
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<(String, String), StoredObject>> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, BTreeMap<(String, String), StoredObject>> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn to_object(loc: Location, stored: &StoredObject) -> Object {
        let mut obj = Object::file(loc, stored.data.len() as u64, Some(stored.modified));
        obj.storage_class = stored.storage_class;
        obj
    }
}

impl StorageClient for MemoryStore {
    fn stat(&self, ctx: &Context, loc: &Location) -> Result<Object> {
        ctx.check()?;
        let map = self.read_map();
        let stored = map
            .get(&(loc.bucket().to_owned(), loc.path().to_owned()))
            .ok_or_else(|| Error::NotFound(loc.clone()))?;
        Ok(Self::to_object(loc.clone(), stored))
    }

    fn list(&self, ctx: &Context, loc: &Location, recursive: bool, mode: ListMode) -> ObjectStream {
        if let Err(e) = ctx.check() {
            return Box::new(std::iter::once(Err(e)));
        }
        let filter = match KeyFilter::new(loc.path(), recursive, mode) {
            Ok(filter) => filter,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        let root = filter.root().to_owned();
        let mut matcher = Matcher::new(filter);

        // Collected eagerly: the read lock is released before any task writes.
        let map = self.read_map();
        let mut items = Vec::new();
        for ((bucket, key), stored) in map.iter() {
            if bucket != loc.bucket() {
                continue;
            }
            match matcher.object(key) {
                Some(KeyMatch::Object { relative }) => {
                    let location = loc.object(key.clone(), relative);
                    items.push(Ok(Self::to_object(location, stored)));
                }
                Some(KeyMatch::Prefix { key }) => {
                    let relative = key[root.len()..].to_owned();
                    items.push(Ok(Object::directory(loc.object(key, relative))));
                }
                None => {}
            }
        }
        Box::new(items.into_iter())
    }

    fn get(&self, ctx: &Context, loc: &Location, sink: &mut dyn Write) -> Result<u64> {
        ctx.check()?;
        let stored = self
            .lookup(loc.bucket(), loc.path())
            .ok_or_else(|| Error::NotFound(loc.clone()))?;
        sink.write_all(&stored.data)?;
        Ok(stored.data.len() as u64)
    }

    fn put(
        &self,
        ctx: &Context,
        source: &mut dyn Read,
        loc: &Location,
        metadata: &Metadata,
    ) -> Result<()> {
        ctx.check()?;
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        let object = StoredObject {
            data,
            modified: SystemTime::now(),
            storage_class: metadata.storage_class,
            content_type: metadata.content_type.clone(),
        };
        self.write_map()
            .insert((loc.bucket().to_owned(), loc.path().to_owned()), object);
        Ok(())
    }

    fn copy(
        &self,
        ctx: &Context,
        src: &Location,
        dst: &Location,
        metadata: &Metadata,
    ) -> Result<()> {
        ctx.check()?;
        let mut map = self.write_map();
        let source = map
            .get(&(src.bucket().to_owned(), src.path().to_owned()))
            .ok_or_else(|| Error::NotFound(src.clone()))?;
        let object = StoredObject {
            data: source.data.clone(),
            modified: SystemTime::now(),
            storage_class: metadata.storage_class.or(source.storage_class),
            content_type: source.content_type.clone(),
        };
        map.insert((dst.bucket().to_owned(), dst.path().to_owned()), object);
        Ok(())
    }

    fn delete(&self, ctx: &Context, loc: &Location) -> Result<()> {
        ctx.check()?;
        self.write_map()
            .remove(&(loc.bucket().to_owned(), loc.path().to_owned()))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(loc.clone()))
    }
}
