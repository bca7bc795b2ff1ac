//! Class discovery
//!
//! [`ClassExplorer`] enumerates the annotated classes under a namespace.
//! Discovery results are cached: indefinitely in production where the class
//! set cannot change, and for a short window otherwise so edits show up on
//! the next request without rescanning on every single one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::config::Environment;

use super::metadata::{ClassMetadata, MetadataRegistry};

/// Cache window for environments where the class set may change underfoot.
const MUTABLE_TTL: Duration = Duration::from_secs(2);

/// Enumerates annotated classes under a namespace.
pub trait ClassExplorer: Send + Sync {
    /// All instantiable annotated classes under `namespace`.
    fn classes_in(&self, namespace: &str) -> Vec<Arc<ClassMetadata>>;
}

/// Explorer backed by the application's metadata registry.
pub struct RegistryExplorer {
    metadata: Arc<MetadataRegistry>,
}

impl RegistryExplorer {
    pub fn new(metadata: Arc<MetadataRegistry>) -> Self {
        Self { metadata }
    }
}

impl ClassExplorer for RegistryExplorer {
    fn classes_in(&self, namespace: &str) -> Vec<Arc<ClassMetadata>> {
        self.metadata
            .classes_in_namespace(namespace)
            .into_iter()
            .filter(|class| class.instantiable)
            .collect()
    }
}

/// Caching wrapper around another explorer.
pub struct CachedExplorer {
    inner: Arc<dyn ClassExplorer>,
    /// `None` means entries never expire
    ttl: Option<Duration>,
    cache: RwLock<HashMap<String, (Instant, Vec<Arc<ClassMetadata>>)>>,
}

impl CachedExplorer {
    pub fn new(inner: Arc<dyn ClassExplorer>, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// TTL policy for an environment: indefinite in production, a short
    /// window everywhere else.
    pub fn for_environment(inner: Arc<dyn ClassExplorer>, environment: &Environment) -> Self {
        let ttl = match environment {
            Environment::Prod => None,
            Environment::Dev | Environment::Other(_) => Some(MUTABLE_TTL),
        };
        Self::new(inner, ttl)
    }

    fn is_fresh(&self, cached_at: Instant) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => cached_at.elapsed() < ttl,
        }
    }
}

impl ClassExplorer for CachedExplorer {
    fn classes_in(&self, namespace: &str) -> Vec<Arc<ClassMetadata>> {
        if let Some((cached_at, classes)) = self.cache.read().get(namespace) {
            if self.is_fresh(*cached_at) {
                return classes.clone();
            }
        }

        let classes = self.inner.classes_in(namespace);
        self.cache
            .write()
            .insert(namespace.to_string(), (Instant::now(), classes.clone()));
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExplorer {
        calls: AtomicUsize,
    }

    impl ClassExplorer for CountingExplorer {
        fn classes_in(&self, _namespace: &str) -> Vec<Arc<ClassMetadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![Arc::new(ClassMetadata::new("demo::types::Product"))]
        }
    }

    #[test]
    fn test_registry_explorer_skips_non_instantiable() {
        let mut metadata = MetadataRegistry::new();
        metadata.register(ClassMetadata::new("demo::types::Product"));
        metadata.register(ClassMetadata::new("demo::types::Sellable").not_instantiable());

        let explorer = RegistryExplorer::new(Arc::new(metadata));
        let classes = explorer.classes_in("demo::types");
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].class, "demo::types::Product");
    }

    #[test]
    fn test_infinite_cache_scans_once() {
        let counting = Arc::new(CountingExplorer {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedExplorer::new(Arc::clone(&counting) as Arc<dyn ClassExplorer>, None);

        cached.classes_in("demo::types");
        cached.classes_in("demo::types");
        cached.classes_in("demo::types");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

        // A different namespace is a separate entry
        cached.classes_in("demo::controllers");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expired_entries_are_rescanned() {
        let counting = Arc::new(CountingExplorer {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedExplorer::new(
            Arc::clone(&counting) as Arc<dyn ClassExplorer>,
            Some(Duration::ZERO),
        );

        cached.classes_in("demo::types");
        cached.classes_in("demo::types");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_environment_policy() {
        let inner = Arc::new(CountingExplorer {
            calls: AtomicUsize::new(0),
        }) as Arc<dyn ClassExplorer>;

        let prod = CachedExplorer::for_environment(Arc::clone(&inner), &Environment::Prod);
        assert!(prod.ttl.is_none());

        let dev = CachedExplorer::for_environment(Arc::clone(&inner), &Environment::Dev);
        assert_eq!(dev.ttl, Some(MUTABLE_TTL));
    }
}
