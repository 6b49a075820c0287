//! Named cache generations on disk.
//!
//! Each generation is a directory under the cache root; each entry is one
//! JSON record holding the request URL and the stored response. Entries
//! are addressed by URL, so concurrent writes to the same key are
//! last-write-wins whole-record replacements.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::fetch::{FetchError, StoredResponse};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// One or more static manifest assets could not be fetched; the whole
    /// install is rejected.
    #[error("install failed fetching {url}: {source}")]
    Install {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// One cached entry on disk.
#[derive(Debug, Serialize, Deserialize)]
struct CachedEntry {
    url: String,
    response: StoredResponse,
}

/// The set of all cache generations under one root directory.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open a generation by name, creating it if absent.
    pub fn open(&self, name: &str) -> Result<Generation, CacheError> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(Generation {
            name: name.to_string(),
            dir,
        })
    }

    /// Names of every generation currently on disk.
    pub fn list(&self) -> Result<Vec<String>, CacheError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a generation and everything in it.
    pub fn delete(&self, name: &str) -> Result<(), CacheError> {
        let dir = self.root.join(name);
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
            debug!(generation = name, "deleted cache generation");
        }
        Ok(())
    }
}

/// One named generation: a map from request URL to stored response.
#[derive(Debug, Clone)]
pub struct Generation {
    name: String,
    dir: PathBuf,
}

impl Generation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a response under its request URL, replacing any prior entry.
    pub fn put(&self, url: &str, response: &StoredResponse) -> Result<(), CacheError> {
        let entry = CachedEntry {
            url: url.to_string(),
            response: response.clone(),
        };
        let contents = serde_json::to_string(&entry)?;
        std::fs::write(self.entry_path(url), contents)?;
        debug!(generation = %self.name, url, "cached response");
        Ok(())
    }

    /// Look up a response by request URL.
    pub fn lookup(&self, url: &str) -> Result<Option<StoredResponse>, CacheError> {
        let path = self.entry_path(url);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        let entry: CachedEntry = serde_json::from_str(&contents)?;
        Ok(Some(entry.response))
    }

    /// Request URLs of every entry in this generation.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut urls = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let contents = std::fs::read_to_string(entry.path())?;
            let cached: CachedEntry = serde_json::from_str(&contents)?;
            urls.push(cached.url);
        }
        urls.sort();
        Ok(urls)
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_key(url)))
    }
}

/// Collision-free file name for a request URL: alphanumerics, '.' and '-'
/// pass through, every other byte becomes `_XX` hex.
fn file_key(url: &str) -> String {
    let mut key = String::with_capacity(url.len());
    for byte in url.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' => key.push(byte as char),
            _ => key.push_str(&format!("_{:02x}", byte)),
        }
    }
    key
}

// ============================================================================
// Tests
// ============================================================================
