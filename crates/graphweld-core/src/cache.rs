//! Cache backends
//!
//! Two backends exist for the bundle's metadata caches: a shared-memory
//! backend for long-lived server processes, and a file backend that survives
//! process boundaries. [`select_backend`] picks one per execution mode; the
//! wiring pass aliases the result under the bundle's cache id.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::error::Result;
use crate::registry::pass::ExecutionMode;

/// Service id of the shared-memory backend
pub const SHARED_MEMORY_CACHE: &str = "graphweld.cache.shared_memory";
/// Service id of the file backend
pub const FILE_CACHE: &str = "graphweld.cache.files";

/// Byte-oriented cache backend.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: Vec<u8>);
}

/// In-process shared-memory cache.
#[derive(Debug, Default)]
pub struct SharedMemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl SharedMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the shared-memory backend is usable in this process.
    pub fn is_supported() -> bool {
        true
    }
}

impl CacheBackend for SharedMemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        self.entries.write().insert(key.to_string(), value);
    }
}

/// File-based cache rooted in a directory.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys may contain path separators; flatten them
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.cache", file_name))
    }
}

impl CacheBackend for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        let path = self.path_for(key);
        if let Err(e) = std::fs::write(&path, value) {
            tracing::warn!("Failed to write cache file {:?}: {}", path, e);
        }
    }
}

/// The backend chosen for one execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheChoice {
    SharedMemory,
    Files,
}

impl CacheChoice {
    /// Service id of the chosen backend.
    pub fn service_id(self) -> &'static str {
        match self {
            Self::SharedMemory => SHARED_MEMORY_CACHE,
            Self::Files => FILE_CACHE,
        }
    }
}

/// Pick the cache backend for a process.
///
/// Shared memory is used when the backend is supported and the process is a
/// long-lived server. Command-line processes fall back to files, because a
/// fresh process sees an empty shared-memory segment, unless shared memory
/// is explicitly enabled for them.
pub fn select_backend(shared_memory_supported: bool, mode: ExecutionMode) -> CacheChoice {
    let use_shared_memory = shared_memory_supported
        && match mode {
            ExecutionMode::Server => true,
            ExecutionMode::Cli {
                shared_memory_enabled,
            } => shared_memory_enabled,
        };

    if use_shared_memory {
        CacheChoice::SharedMemory
    } else {
        CacheChoice::Files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_memory_round_trip() {
        let cache = SharedMemoryCache::new();
        assert!(cache.get("schema").is_none());
        cache.set("schema", b"payload".to_vec());
        assert_eq!(cache.get("schema").unwrap(), b"payload");
    }

    #[test]
    fn test_file_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("cache")).unwrap();
        assert!(cache.get("schema/main").is_none());
        cache.set("schema/main", b"payload".to_vec());
        assert_eq!(cache.get("schema/main").unwrap(), b"payload");
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(
            select_backend(true, ExecutionMode::Server),
            CacheChoice::SharedMemory
        );
        assert_eq!(
            select_backend(false, ExecutionMode::Server),
            CacheChoice::Files
        );
        assert_eq!(
            select_backend(
                true,
                ExecutionMode::Cli {
                    shared_memory_enabled: false
                }
            ),
            CacheChoice::Files
        );
        assert_eq!(
            select_backend(
                true,
                ExecutionMode::Cli {
                    shared_memory_enabled: true
                }
            ),
            CacheChoice::SharedMemory
        );
    }
}
