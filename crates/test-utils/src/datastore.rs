//! # In-Memory Datastore

use std::sync::Arc;

use anyhow::Result;
use credibil_core::datastore::Datastore;
use dashmap::DashMap;

/// A `Datastore` backed by a concurrent map. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryDatastore {
    items: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryDatastore {
    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Datastore for MemoryDatastore {
    async fn put(&self, owner: &str, partition: &str, key: &str, data: &[u8]) -> Result<()> {
        self.items.insert(format!("{owner}-{partition}-{key}"), data.to_vec());
        Ok(())
    }

    async fn get(&self, owner: &str, partition: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.items.get(&format!("{owner}-{partition}-{key}")).map(|v| v.clone()))
    }

    async fn delete(&self, owner: &str, partition: &str, key: &str) -> Result<()> {
        self.items.remove(&format!("{owner}-{partition}-{key}"));
        Ok(())
    }
}
