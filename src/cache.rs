//! # Cache Module
//!
//! Persists the last usage response between statusline invocations so the
//! remote endpoint is hit at most once per TTL.
//!
//! Storage is behind [`KvStore`]: production uses [`FileStore`] (one JSON
//! file per key in the temp directory), tests can use [`MemoryStore`].
//! [`UsageCache`] layers the `{timestamp, data}` envelope and TTL on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::models::UsageQuota;
use crate::utils::now_epoch_secs;

/// Default cache TTL in seconds
pub const CACHE_TTL_SECONDS: f64 = 300.0;

/// Key of the usage entry (`<tmp>/claude-usage-cache.json` with [`FileStore`])
pub const USAGE_CACHE_KEY: &str = "claude-usage-cache";

pub trait KvStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: &Value) -> Result<()>;
}

/// One JSON document per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let raw = fs::read_to_string(self.path_for(key)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(key, error = %err, "ignoring corrupt cache file");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))
    }
}

/// Process-local store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &Value) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))?;
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// On-disk envelope: when it was fetched and what came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub timestamp: f64,
    pub data: UsageQuota,
}

pub struct UsageCache {
    store: Box<dyn KvStore>,
    ttl_secs: f64,
}

impl UsageCache {
    pub fn new(store: Box<dyn KvStore>, ttl_secs: f64) -> Self {
        Self { store, ttl_secs }
    }

    /// Default TTL over the temp-dir file store.
    pub fn on_disk() -> Self {
        Self::new(Box::new(FileStore::in_temp_dir()), CACHE_TTL_SECONDS)
    }

    pub fn load(&self) -> Option<UsageQuota> {
        self.load_at(now_epoch_secs())
    }

    /// Cached quota if present, well-formed and younger than the TTL at `now`.
    pub fn load_at(&self, now: f64) -> Option<UsageQuota> {
        let value = self.store.get(USAGE_CACHE_KEY)?;
        let entry: CacheEntry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "cache entry has unexpected shape");
                return None;
            }
        };
        let age = now - entry.timestamp;
        if age < self.ttl_secs {
            tracing::debug!(age_secs = age, "usage cache hit");
            Some(entry.data)
        } else {
            tracing::debug!(age_secs = age, "usage cache expired");
            None
        }
    }

    pub fn save(&self, data: &UsageQuota) {
        self.save_at(data, now_epoch_secs());
    }

    /// Best effort: a failed write is logged and otherwise ignored.
    pub fn save_at(&self, data: &UsageQuota, now: f64) {
        let entry = CacheEntry {
            timestamp: now,
            data: data.clone(),
        };
        let result = serde_json::to_value(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|value| self.store.put(USAGE_CACHE_KEY, &value));
        if let Err(err) = result {
            tracing::debug!(error = %err, "usage cache write failed");
        }
    }
}
