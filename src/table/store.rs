//! Durable row storage
//!
//! Rows outlive the process here. Failures are reported to the cache, which
//! logs them and treats the lookup as a miss.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored value for '{0}' is corrupt")]
    Corrupt(String),
}

/// Key-value store for encoded rows, keyed `dataset|length:guess`
pub trait DurableStore: Send + Sync {
    /// # Errors
    /// Backend failures. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// # Errors
    /// Backend failures.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove every entry
    ///
    /// # Errors
    /// Backend failures.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Store key for a row
#[must_use]
pub fn row_key(dataset: &str, word_len: usize, guess: &str) -> String {
    format!("{dataset}|{word_len}:{guess}")
}

/// One file per row under a directory
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

const ROW_EXT: &str = "row";
const TMP_EXT: &str = "tmp";

impl FsStore {
    /// Open (creating if needed) a store rooted at `dir`
    ///
    /// # Errors
    /// If the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys contain separators, so file names are their hex bytes
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() * 2 + 4);
        for b in key.bytes() {
            let _ = write!(name, "{b:02x}");
        }
        self.dir.join(name).with_extension(ROW_EXT)
    }
}

impl DurableStore for FsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        // Unique temp name per writer; the rename makes the row visible at once
        let written = tempfile::Builder::new()
            .prefix("put-")
            .suffix(&format!(".{TMP_EXT}"))
            .tempfile_in(&self.dir)
            .and_then(|mut tmp| {
                tmp.write_all(value)?;
                tmp.persist(&path).map_err(|e| e.error)?;
                Ok(())
            });
        written.map_err(|source| StorageError::Io { path, source })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.dir.clone(),
            source,
        };
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path
                .extension()
                .is_some_and(|ext| ext == ROW_EXT || ext == TMP_EXT)
            {
                fs::remove_file(&path).map_err(|source| StorageError::Io { path, source })?;
            }
        }
        Ok(())
    }
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.entries.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(row_key("en", 5, "crane"), "en|5:crane");
    }

    #[test]
    fn fs_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = row_key("en", 5, "crane");
        {
            let store = FsStore::open(dir.path()).unwrap();
            assert_eq!(store.get(&key).unwrap(), None);
            store.put(&key, &[1, 2, 3]).unwrap();
        }
        let store = FsStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&key).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn fs_store_clear_only_removes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path().join("rows")).unwrap();
        store.put("a|5:crane", &[1]).unwrap();
        store.put("a|5:slate", &[2]).unwrap();
        let other = store.dir().join("notes.txt");
        fs::write(&other, "keep").unwrap();

        store.clear().unwrap();
        assert_eq!(store.get("a|5:crane").unwrap(), None);
        assert_eq!(store.get("a|5:slate").unwrap(), None);
        assert!(other.exists());
    }

    #[test]
    fn clear_sweeps_abandoned_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        let stale = store.dir().join("put-abc123.tmp");
        fs::write(&stale, [7]).unwrap();

        store.clear().unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn concurrent_writers_on_one_key_leave_a_whole_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        let key = row_key("en", 5, "crane");
        std::thread::scope(|scope| {
            for i in 0..8u8 {
                let (store, key) = (&store, &key);
                scope.spawn(move || {
                    for _ in 0..20 {
                        store.put(key, &[i; 64]).unwrap();
                    }
                });
            }
        });

        let row = store.get(&key).unwrap().unwrap();
        assert_eq!(row.len(), 64);
        assert!(row.iter().all(|&b| b == row[0]));
        let leftovers = fs::read_dir(store.dir())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == TMP_EXT)
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn distinct_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        store.put("a|5:crane", &[1]).unwrap();
        store.put("a_5_crane", &[2]).unwrap();
        assert_eq!(store.get("a|5:crane").unwrap(), Some(vec![1]));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.put("k", &[9]).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(vec![9]));
        assert_eq!(store.len(), 1);
        store.clear().unwrap();
        assert!(store.is_empty());
    }
}
