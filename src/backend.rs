// Storage backends - where the store document lives
//
// The repository only ever loads the whole document and saves the whole
// document, so a backend is two calls. Production uses a pretty-printed JSON
// file; tests swap in the in-memory backend.

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use parking_lot::Mutex;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

pub trait StorageBackend: Send + Sync {
    /// Read the full document. A missing or unreadable document is replaced by
    /// the empty store, which is persisted before being returned.
    fn load(&self) -> StoreResult<Store>;

    /// Replace the full document.
    fn save(&self, store: &Store) -> StoreResult<()>;

    /// Short tag for logs
    fn describe(&self) -> String;
}

// ============================================================================
// JSON FILE
// ============================================================================

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Only unparsable text or a non-object top level counts as corrupt.
    /// Collections of an unexpected shape are kept (see `Store::from_value`).
    fn read(&self) -> StoreResult<Store> {
        let raw = fs::read_to_string(&self.path)?;
        let doc: Value = serde_json::from_str(&raw)?;
        Store::from_value(doc)
            .ok_or_else(|| StoreError::InvalidFormat("top level is not an object".to_string()))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> StoreResult<Store> {
        match self.read() {
            Ok(store) => Ok(store),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "unable to read data file, initializing empty store"
                );
                let store = Store::default();
                self.save(&store)?;
                Ok(store)
            }
        }
    }

    fn save(&self, store: &Store) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(store)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename so a crash mid-write leaves the previous document
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Keeps the document in memory. Counts saves and can be told to refuse
/// writes, which is how tests reach the failure paths.
#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
    saves: AtomicUsize,
    fail_writes: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Store) -> Self {
        MemoryBackend {
            store: Mutex::new(store),
            ..Self::default()
        }
    }

    /// Every save fails with an IO error
    pub fn failing() -> Self {
        MemoryBackend {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Store {
        self.store.lock().clone()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> StoreResult<Store> {
        Ok(self.store.lock().clone())
    }

    fn save(&self, store: &Store) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "memory backend is read-only",
            )));
        }
        *self.store.lock() = store.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
