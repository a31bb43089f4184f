use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a `fjall` partition, entries JSON encoded with their expiry.
pub struct DiskCache<K, V> {
    // Held so the partition outlives every handle to it.
    _keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn open(path: &Path, partition: &str) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition(partition, PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
            _marker: PhantomData,
        })
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(bytes) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };
        let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
        if entry.expires_at.is_some_and(|at| SystemTime::now() > at) {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|d| SystemTime::now() + d);
        let entry = CacheEntry { value, expires_at };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {:?}", key);
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<()> {
        self.partition.remove(serde_json::to_vec(key)?)?;
        debug!("Cache REMOVE for key: {:?}", key);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let keys = self.partition.keys().collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        debug!("Cache CLEAR");
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Eq + Hash + Send + Sync + Serialize + Debug,
    V: Clone + Send + Sync + Serialize + DeserializeOwned,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.read(key).unwrap_or_else(|e| {
            debug!("Disk cache get error: {}", e);
            None
        })
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        if let Err(e) = self.write(&key, value, ttl) {
            debug!("Disk cache put error: {}", e);
        }
    }

    async fn remove(&self, key: &K) {
        if let Err(e) = self.delete(key) {
            debug!("Disk cache remove error: {}", e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.delete_all() {
            debug!("Disk cache clear error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<String, i32>::open(dir.path(), "test").unwrap();

        assert!(cache.get(&"011102".to_string()).await.is_none());

        cache.put("011102".to_string(), 123, None).await;
        assert_eq!(cache.get(&"011102".to_string()).await, Some(123));
        assert!(cache.get(&"010434".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<String, i32>::open(dir.path(), "test").unwrap();

        cache
            .put("011102".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"011102".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"011102".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove_and_clear() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::<String, i32>::open(dir.path(), "test").unwrap();

        cache.put("011102".to_string(), 1, None).await;
        cache.put("010434".to_string(), 2, None).await;

        cache.remove(&"011102".to_string()).await;
        assert!(cache.get(&"011102".to_string()).await.is_none());
        assert_eq!(cache.get(&"010434".to_string()).await, Some(2));

        cache.clear().await;
        assert!(cache.get(&"010434".to_string()).await.is_none());
    }
}
