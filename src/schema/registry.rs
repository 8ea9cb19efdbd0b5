use std::sync::Arc;

use parking_lot::RwLock;

use super::mapping::DocMapping;

/// Registry of document mappings keyed by record type key.
///
/// Thread-safe for concurrent reads with occasional writes. Types are
/// registered once at startup and read by index lifecycle operations.
#[derive(Debug, Default)]
pub struct MappingRegistry {
    /// Kept in registration order so indexes are created deterministically.
    mappings: RwLock<Vec<(String, Arc<DocMapping>)>>,
}

impl MappingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping for a type key, replacing any previous one.
    pub fn register(&self, type_key: &str, mapping: DocMapping) {
        let mapping = Arc::new(mapping);
        let mut mappings = self.mappings.write();

        if let Some(pos) = mappings.iter().position(|(k, _)| k == type_key) {
            mappings[pos].1 = mapping;
        } else {
            mappings.push((type_key.to_string(), mapping));
        }
    }

    /// Returns `true` if the type key was found and removed.
    pub fn unregister(&self, type_key: &str) -> bool {
        let mut mappings = self.mappings.write();
        if let Some(pos) = mappings.iter().position(|(k, _)| k == type_key) {
            mappings.remove(pos);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn get(&self, type_key: &str) -> Option<Arc<DocMapping>> {
        self.mappings
            .read()
            .iter()
            .find(|(k, _)| k == type_key)
            .map(|(_, m)| Arc::clone(m))
    }

    /// All registered mappings in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<DocMapping>> {
        self.mappings.read().iter().map(|(_, m)| Arc::clone(m)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.read().is_empty()
    }
}
