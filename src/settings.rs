//! Settings-store boundary: an opaque string-keyed blob store assumed to be
//! partitioned per user identity by the host. Two implementations ship here;
//! hosts with their own settings service implement the trait instead.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io::ErrorKind};
use tracing::debug;

/// Host settings service. `load_setting` returns `None` for an absent key;
/// storage-level failures are recovered inside the implementation (logged,
/// reported as absent) so callers only see presence or absence.
pub trait SettingsStore {
    fn load_setting(&self, key: &str) -> Option<String>;
    fn save_setting(&self, key: &str, value: &str);
}

/// In-memory store, shared via `Arc` clones. Primarily for tests and
/// short-lived embedding hosts.
#[derive(Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<Mutex<HashMap<String, String>>>, // key -> blob
}

impl MemorySettingsStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.inner.lock().len() }
    pub fn is_empty(&self) -> bool { self.inner.lock().is_empty() }
}

impl SettingsStore for MemorySettingsStore {
    fn load_setting(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    fn save_setting(&self, key: &str, value: &str) {
        self.inner.lock().insert(key.to_string(), value.to_string());
    }
}

/// Filesystem store: one file per key under a root directory. Keys are
/// sanitized to a conservative filename alphabet so arbitrary view/table
/// identifiers cannot escape the root.
pub struct FileSettingsStore {
    root: PathBuf,
}

impl FileSettingsStore {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.setting", safe))
    }

    fn try_save(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating settings root {}", self.root.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("writing setting {}", path.display()))?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn load_setting(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                debug!("[settings] failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save_setting(&self, key: &str, value: &str) {
        if let Err(e) = self.try_save(key, value) {
            debug!("[settings] failed to save '{}': {:#}", key, e);
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
