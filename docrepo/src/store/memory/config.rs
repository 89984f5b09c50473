use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration of an [`InMemoryDatabase`](super::InMemoryDatabase).
///
/// ```rust
/// use docrepo::store::memory::InMemoryStoreConfig;
///
/// let config = InMemoryStoreConfig::new();
/// assert!(config.generate_ids());
/// config.set_generate_ids(false);
/// assert!(!config.generate_ids());
/// ```
#[derive(Clone)]
pub struct InMemoryStoreConfig {
    inner: Arc<InMemoryStoreConfigInner>,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig {
            inner: Arc::new(InMemoryStoreConfigInner::new()),
        }
    }

    /// Whether inserting a document without an identity assigns a generated one.
    /// When disabled such inserts fail.
    pub fn generate_ids(&self) -> bool {
        self.inner.generate_ids.load(Ordering::Relaxed)
    }

    pub fn set_generate_ids(&self, generate_ids: bool) {
        self.inner.generate_ids.store(generate_ids, Ordering::Relaxed)
    }
}

struct InMemoryStoreConfigInner {
    generate_ids: AtomicBool,
}

impl InMemoryStoreConfigInner {
    fn new() -> InMemoryStoreConfigInner {
        InMemoryStoreConfigInner {
            generate_ids: AtomicBool::new(true),
        }
    }
}
