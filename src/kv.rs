// Key-value persistence backends
//
// The store keeps each piece of durable state (the task collection, the theme
// preference) under its own key and rewrites the whole value on every change.

use crate::config::Backend;
use crate::sqlite::SqliteKv;
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Durable string storage addressed by key
pub trait KeyValue {
    /// Read the value under `key`, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Drop `key`; absent keys are ignored
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<K: KeyValue + ?Sized> KeyValue for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Open the backend selected in the configuration inside `dir`
pub fn open_backend(backend: Backend, dir: &Path) -> Result<Box<dyn KeyValue>> {
    debug!(?backend, dir = ?dir, "Opening key-value backend");
    Ok(match backend {
        Backend::Sqlite => Box::new(SqliteKv::open(dir.join("taskpad.db"))?),
        Backend::Files => Box::new(FileKv::open(dir)?),
    })
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Volatile backend, mainly for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// File-per-key backend
// ============================================================================

/// One `<key>.value` file per key
///
/// Writers hold an exclusive lock on `.<key>.lock` and persist a fully
/// written `NamedTempFile` over the value file; readers never see a partial
/// value.
#[derive(Debug)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create key-value directory")?;
        Ok(Self { dir })
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.value", key))
    }

    fn lock_file(&self, key: &str) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(format!(".{}.lock", key)))
            .context("Failed to open lock file")
    }
}

impl KeyValue for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let lock = self.lock_file(key)?;
        lock.lock_shared().context("Failed to acquire shared lock")?;
        let value = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.value_path(key);

        let lock = self.lock_file(key)?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut tmp = NamedTempFile::new_in(&self.dir).context("Failed to create temporary file")?;
        tmp.write_all(value.as_bytes())
            .context("Failed to write to temporary file")?;
        tmp.as_file().sync_all().context("Failed to sync temporary file")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {:?}", path))?;

        debug!(key, bytes = value.len(), "Wrote value file");
        // Lock is released when `lock` is dropped
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.value_path(key);
        if path.exists() {
            let lock = self.lock_file(key)?;
            lock.lock_exclusive().context("Failed to acquire file lock")?;
            fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
        }
        Ok(())
    }
}
