//! Key/value persistence injected into the session
//!
//! - `MemoryStore`: process-local, used by tests and as a fallback
//! - `FileStore`: one JSON object on disk (native only)
//! - `BrowserStore`: `sessionStorage` / `localStorage` (wasm32 only)

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::KeyValueStore;
    use anyhow::{Context, Result};
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    /// Whole-file JSON object store. Every write rewrites the file.
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref().to_path_buf();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create storage directory {}", parent.display())
                    })?;
                }
            }
            Ok(Self { path })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load(&self) -> BTreeMap<String, String> {
            match std::fs::read_to_string(&self.path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("ignoring unreadable store {}: {e}", self.path.display());
                    BTreeMap::new()
                }),
                Err(_) => BTreeMap::new(),
            }
        }

        fn save(&self, items: &BTreeMap<String, String>) -> Result<()> {
            let content = serde_json::to_string_pretty(items)?;
            std::fs::write(&self.path, content)
                .with_context(|| format!("failed to write {}", self.path.display()))
        }
    }

    impl KeyValueStore for FileStore {
        fn get(&self, key: &str) -> Option<String> {
            self.load().remove(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let mut items = self.load();
            items.insert(key.to_string(), value.to_string());
            self.save(&items)
        }

        fn remove(&self, key: &str) -> Result<()> {
            let mut items = self.load();
            if items.remove(key).is_some() {
                self.save(&items)?;
            }
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserStore, StorageScope};

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::KeyValueStore;
    use anyhow::{anyhow, Result};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum StorageScope {
        /// Cleared when the tab closes.
        Session,
        Local,
    }

    /// Web Storage backed store. Missing storage (privacy modes, sandboxed
    /// frames) reads as empty and fails writes.
    #[derive(Clone, Copy, Debug)]
    pub struct BrowserStore {
        scope: StorageScope,
    }

    impl BrowserStore {
        pub fn new(scope: StorageScope) -> Self {
            Self { scope }
        }

        fn storage(&self) -> Option<web_sys::Storage> {
            let win = web_sys::window()?;
            let storage = match self.scope {
                StorageScope::Session => win.session_storage(),
                StorageScope::Local => win.local_storage(),
            };
            storage.ok().flatten()
        }
    }

    impl KeyValueStore for BrowserStore {
        fn get(&self, key: &str) -> Option<String> {
            self.storage()?.get_item(key).ok().flatten()
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let storage = self.storage().ok_or_else(|| anyhow!("web storage unavailable"))?;
            storage
                .set_item(key, value)
                .map_err(|e| anyhow!("storage write failed: {e:?}"))
        }

        fn remove(&self, key: &str) -> Result<()> {
            let storage = self.storage().ok_or_else(|| anyhow!("web storage unavailable"))?;
            storage
                .remove_item(key)
                .map_err(|e| anyhow!("storage remove failed: {e:?}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set("sendx.connected", "true").unwrap();
        store.set("other", "1").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("sendx.connected").as_deref(), Some("true"));
        reopened.remove("other").unwrap();
        assert_eq!(store.get("other"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("anything"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
