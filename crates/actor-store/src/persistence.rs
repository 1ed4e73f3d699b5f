//! # Persistence Adapters
//!
//! A deliberately small key/value contract: load a whole collection, save a
//! whole collection. There is no partial update and no transaction, so the
//! owning [`StoreActor`](crate::StoreActor) always rewrites the full value.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Pluggable backend for store actors.
pub trait Persistence: Send + Sync + 'static {
    /// Returns the stored value, or `None` if the key was never written.
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    fn save(&self, key: &str, contents: &str) -> io::Result<()>;
}

/// In-memory backend. Clones share the same map, so a test can drop a store
/// and reopen it to simulate a new session.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, for assertions.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| io::Error::other("memory persistence poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, contents: &str) -> io::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| io::Error::other("memory persistence poisoned"))?;
        values.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

/// One JSON file per key under a directory.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    /// Creates the directory if it does not exist yet.
    pub fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, key: &str, contents: &str) -> io::Result<()> {
        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &target)
    }
}
