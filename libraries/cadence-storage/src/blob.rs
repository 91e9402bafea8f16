//! Blob backends
//!
//! Raw track bytes keyed by track id. Only used when the host opts in; the
//! default persistence keeps metadata only.

use crate::error::{Result, StorageError};
use crate::kv::validate_key;
use cadence_core::TrackId;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Byte store addressed by track id
pub trait BlobStore {
    fn put(&mut self, id: &TrackId, bytes: &[u8]) -> Result<()>;

    /// Read a blob; `Ok(None)` when absent
    fn get(&self, id: &TrackId) -> Result<Option<Vec<u8>>>;

    fn contains(&self, id: &TrackId) -> Result<bool>;

    /// Delete a blob; deleting a missing blob succeeds
    fn delete(&mut self, id: &TrackId) -> Result<()>;

    /// Ids of every stored blob
    fn ids(&self) -> Result<Vec<TrackId>>;
}

/// Volatile blob store
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<TrackId, Arc<[u8]>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, id: &TrackId, bytes: &[u8]) -> Result<()> {
        self.blobs.insert(id.clone(), Arc::from(bytes));
        Ok(())
    }

    fn get(&self, id: &TrackId) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(id).map(|bytes| bytes.to_vec()))
    }

    fn contains(&self, id: &TrackId) -> Result<bool> {
        Ok(self.blobs.contains_key(id))
    }

    fn delete(&mut self, id: &TrackId) -> Result<()> {
        self.blobs.remove(id);
        Ok(())
    }

    fn ids(&self) -> Result<Vec<TrackId>> {
        Ok(self.blobs.keys().cloned().collect())
    }
}

/// One `<track id>.blob` file per track inside a directory
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    dir: PathBuf,
}

const BLOB_EXTENSION: &str = "blob";

impl DirBlobStore {
    /// Open (and create if needed) a blob directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &TrackId) -> Result<PathBuf> {
        validate_key(id.as_str())
            .map_err(|_| StorageError::backend(format!("track id not usable as blob name: {id}")))?;
        Ok(self.dir.join(format!("{}.{BLOB_EXTENSION}", id.as_str())))
    }
}

impl BlobStore for DirBlobStore {
    fn put(&mut self, id: &TrackId, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(id)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    fn get(&self, id: &TrackId) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(id)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn contains(&self, id: &TrackId) -> Result<bool> {
        Ok(self.path_for(id)?.is_file())
    }

    fn delete(&mut self, id: &TrackId) -> Result<()> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn ids(&self) -> Result<Vec<TrackId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(TrackId::new(stem));
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_store_lists_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirBlobStore::open(dir.path()).unwrap();
        let a = TrackId::new("1-aaaa");
        let b = TrackId::new("2-bbbb");

        store.put(&a, b"first").unwrap();
        store.put(&b, b"second").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut ids = store.ids().unwrap();
        ids.sort();
        assert_eq!(ids, vec![a.clone(), b.clone()]);

        assert_eq!(store.get(&a).unwrap().as_deref(), Some(&b"first"[..]));
        store.delete(&a).unwrap();
        store.delete(&a).unwrap();
        assert!(!store.contains(&a).unwrap());
        assert!(store.contains(&b).unwrap());
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryBlobStore::new();
        let id = TrackId::new("x");
        assert_eq!(store.get(&id).unwrap(), None);
        store.put(&id, &[1, 2, 3]).unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
    }
}
