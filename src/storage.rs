use crate::errors::StorageError;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{error, warn};

pub const ACTIVITY_DATA_KEY: &str = "activity-data";
pub const LOGGED_IN_KEY: &str = "activity-logged-in";
pub const THEME_KEY: &str = "activity-theme";
pub const NOTIFICATIONS_KEY: &str = "activity-notifications";

/// Local durable key-value storage with string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// A fault met while opening the store, reported once.
    fn take_open_error(&mut self) -> Option<StorageError> {
        None
    }
}

/// All keys kept in one pretty-printed JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    open_error: Option<StorageError>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store. An
    /// unreadable or unparsable one opens empty and the fault is kept for
    /// [`KeyValueStore::take_open_error`]; an unparsable file is moved aside
    /// to `<path>.corrupt` first so the next write does not destroy it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (entries, open_error) = match load_entries(&path) {
            Ok(entries) => (entries, None),
            Err(err) => (BTreeMap::new(), Some(err)),
        };
        Self {
            path,
            entries,
            open_error,
        }
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        blocking(|| {
            fs::write(&tmp, payload)?;
            fs::rename(&tmp, &self.path)
        })?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn take_open_error(&mut self) -> Option<StorageError> {
        self.open_error.take()
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                error!("failed to parse store file {}: {err}", path.display());
                let backup = backup_path(path);
                if let Err(rename_err) = fs::rename(path, &backup) {
                    warn!("failed to move corrupt store file aside: {rename_err}");
                }
                Err(StorageError::Decode {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(err) => {
            error!("failed to read store file {}: {err}", path.display());
            Err(err.into())
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

/// Runs blocking file I/O without stalling a multi-threaded tokio worker.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

/// In-process store. Writes can be made to fail to simulate an unavailable
/// or full backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
