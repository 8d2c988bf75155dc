//! Process-wide memoization of loaded tables.
//!
//! Entries are keyed by canonical source path, file modification time and
//! sheet name. A rewritten file therefore loads under a new key; nothing is
//! evicted except through [`TableCache::clear`].

use crate::error::Result;
use crate::loader::{read_table, LoadOptions};
use crate::table::Table;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    sheet: String,
}

impl CacheKey {
    fn for_source(path: &Path, options: &LoadOptions) -> Result<Self> {
        let path = path.canonicalize()?;
        let modified = std::fs::metadata(&path)?.modified().ok();
        Ok(Self {
            path,
            modified,
            sheet: options.sheet.clone(),
        })
    }
}

/// Table cache
pub struct TableCache {
    entries: Mutex<HashMap<CacheKey, Arc<Table>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached table for this source, loading it on first use.
    pub fn get_or_load(&self, path: &Path, options: &LoadOptions) -> Result<Arc<Table>> {
        let key = CacheKey::for_source(path, options)?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(table) = entries.get(&key) {
            debug!("Table cache hit for {}", key.path.display());
            return Ok(Arc::clone(table));
        }

        debug!("Table cache miss for {}", key.path.display());
        let table = Arc::new(read_table(&key.path, options)?);
        entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    pub static ref GLOBAL_TABLE_CACHE: TableCache = TableCache::new();
}
