//! # Datastore

use anyhow::Result;

/// `Datastore` is used by implementers to provide durable, keyed data
/// storage. Implementations backing a multi-instance deployment must be
/// shared between instances.
pub trait Datastore: Send + Sync {
    /// Store a data item in the underlying item store, replacing any existing
    /// item with the same key.
    fn put(
        &self, owner: &str, partition: &str, key: &str, data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetches a single item from the underlying store, returning `None` if
    /// no match was found.
    fn get(
        &self, owner: &str, partition: &str, key: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Delete the specified data item.
    fn delete(
        &self, owner: &str, partition: &str, key: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
