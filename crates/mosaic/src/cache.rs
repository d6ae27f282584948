// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compiled output caching.
//!
//! Compilation is deterministic, so an output can be reused whenever the
//! source text and the options are unchanged. Entries are keyed by
//! [`cache_key`], a SHA-256 over both.
//!
//! - [`MemoryCache`]: in-memory LRU cache
//! - [`NoOpCache`]: never stores anything
//!
//! Implement [`Cache`] for other storage.

use crate::compiler::{CompileOptions, CompileOutput};
use crate::error::{CompileError, Result};
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Storage for compiled outputs.
pub trait Cache: Send + Sync + std::fmt::Debug {
    /// Looks up an output.
    fn get(&self, key: &str) -> Result<Option<Arc<CompileOutput>>>;
    /// Stores an output.
    fn set(&self, key: &str, output: Arc<CompileOutput>) -> Result<()>;
    /// Drops an output.
    fn remove(&self, key: &str) -> Result<()>;
    /// Drops everything.
    fn clear(&self) -> Result<()>;
    /// Whether `key` is present.
    fn contains_key(&self, key: &str) -> bool;
}

/// Hex SHA-256 of the source text and the options it is compiled with.
pub fn cache_key(source: &str, options: &CompileOptions) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(options)?);
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// In-memory LRU cache.
///
/// ```rust
/// use mosaic::{Cache, MemoryCache};
///
/// let cache = MemoryCache::new(64).unwrap();
/// assert!(!cache.contains_key("missing"));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryCache {
    cache: Arc<Mutex<LruCache<String, Arc<CompileOutput>>>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` outputs.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| CompileError::Cache("Cache capacity must be greater than zero".to_string()))?;
        Ok(Self { cache: Arc::new(Mutex::new(LruCache::new(capacity))) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, Arc<CompileOutput>>>> {
        self.cache
            .lock()
            .map_err(|_| CompileError::Cache("Failed to acquire cache lock".to_string()))
    }

    /// Number of cached outputs.
    pub fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Arc<CompileOutput>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, output: Arc<CompileOutput>) -> Result<()> {
        self.lock()?.put(key.to_string(), output);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.pop(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn contains_key(&self, key: &str) -> bool {
        self.lock().map(|cache| cache.contains(key)).unwrap_or(false)
    }
}

/// Cache that never stores or retrieves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

impl Cache for NoOpCache {
    fn get(&self, _key: &str) -> Result<Option<Arc<CompileOutput>>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _output: Arc<CompileOutput>) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }

    fn contains_key(&self, _key: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::DomFlavor;
    use crate::sourcemap::SourceMap;

    fn output(code: &str) -> Arc<CompileOutput> {
        Arc::new(CompileOutput {
            code: code.to_string(),
            map: SourceMap::new(),
            css: None,
            renderers: vec!["renderMainFragment".to_string()],
        })
    }

    #[test]
    fn key_depends_on_source_and_options() {
        let options = CompileOptions::default();
        let injected = CompileOptions { dom: DomFlavor::Injected, ..CompileOptions::default() };

        let key = cache_key("<p></p>", &options).unwrap();
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key("<p></p>", &options).unwrap());
        assert_ne!(key, cache_key("<p> </p>", &options).unwrap());
        assert_ne!(key, cache_key("<p></p>", &injected).unwrap());
    }

    #[test]
    fn memory_cache_evicts_least_recent() {
        let cache = MemoryCache::new(2).unwrap();
        cache.set("a", output("a")).unwrap();
        cache.set("b", output("b")).unwrap();
        assert!(cache.get("a").unwrap().is_some());

        cache.set("c", output("c")).unwrap();
        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert_eq!(cache.len(), 2);

        cache.remove("a").unwrap();
        assert!(!cache.contains_key("a"));
        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(MemoryCache::new(0), Err(CompileError::Cache(_))));
    }

    #[test]
    fn noop_cache_stores_nothing() {
        let cache = NoOpCache;
        cache.set("a", output("a")).unwrap();
        assert!(cache.get("a").unwrap().is_none());
    }
}
