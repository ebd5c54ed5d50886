use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Process-local store. Unbounded, and entries never expire: the TTL passed
/// to `set` is accepted for interface parity with redis and then ignored.
#[derive(Clone, Debug, Default)]
pub struct MemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryCacheStore {
    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    pub async fn set(&self, key: &str, value: Vec<u8>, _ttl_seconds: u64) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCacheStore;

    #[tokio::test]
    async fn stores_and_removes_entries() {
        let store = MemoryCacheStore::default();
        store.set("a", b"1".to_vec(), 1).await.unwrap();
        store.set("b", b"2".to_vec(), 1).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.len().await, 2);

        store.del("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryCacheStore::default();
        let other = store.clone();
        store.set("k", b"v".to_vec(), 1).await.unwrap();

        assert_eq!(other.get("k").await.unwrap(), Some(b"v".to_vec()));
    }
}
