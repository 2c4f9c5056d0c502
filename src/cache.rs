//! Read-through cache with a fixed time to live.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;

use crate::runtime::Instant;

/// Maps keys to `(inserted_at, value)`.
///
/// Entries are never evicted; an entry older than the TTL is ignored on the
/// next read and overwritten by the refresh.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if it is younger than the TTL.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|(inserted_at, _)| inserted_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.lock().insert(key, (Instant::now(), value));
    }

    /// Returns the fresh cached value, or runs `refresh` and stores its result.
    ///
    /// A failed refresh leaves the cache untouched, so a transient error is
    /// never remembered as a value.
    pub async fn get_or_refresh<F, Fut, E>(&self, key: K, refresh: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = refresh().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn refresh_counting(calls: &AtomicUsize) -> Result<bool, ()> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_is_reused() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.get_or_refresh(1, || refresh_counting(&calls)).await, Ok(true));
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get_or_refresh(1, || refresh_counting(&calls)).await, Ok(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.get_or_refresh(1, || refresh_counting(&calls)).await, Ok(true));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_is_not_cached() {
        let cache: TtlCache<u32, bool> = TtlCache::new(Duration::from_secs(60));

        let result = cache.get_or_refresh(1, || async { Err::<bool, &str>("down") }).await;
        assert_eq!(result, Err("down"));
        assert!(cache.get(&1).is_none());
        assert!(cache.is_empty());

        let result = cache.get_or_refresh(1, || async { Ok::<bool, &str>(false) }).await;
        assert_eq!(result, Ok(false));
        assert_eq!(cache.get(&1), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_ignored() {
        let cache = TtlCache::new(Duration::from_secs(10));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.len(), 1);
    }
}
