//! Short-lived memoization of external lookups (geocodes, routes).

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Get/set capability handed to collaborators that memoize lookups.
pub trait LookupCache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V, ttl: Duration);
}

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
    fn is_expired(&self, now: Instant) -> bool;
}

/// Drop expired entries, then the oldest ones until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    cache.retain(|_, entry| !entry.is_expired(now));

    if cache.len() <= max_entries {
        return;
    }

    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
        .collect();
    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

#[derive(Debug, Clone)]
struct CachedValue<V> {
    value: V,
    fetched_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry for CachedValue<V> {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) > self.ttl
    }
}

/// In-process `LookupCache` backed by a `DashMap`.
pub struct MemoryLookupCache<V> {
    entries: DashMap<String, CachedValue<V>>,
    max_entries: usize,
}

impl<V> MemoryLookupCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> LookupCache<V> for MemoryLookupCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CachedValue {
                value,
                fetched_at: Instant::now(),
                ttl,
            },
        );
        if self.entries.len() > self.max_entries {
            prune_cache(&self.entries, self.max_entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_values() {
        let cache = MemoryLookupCache::new(8);
        cache.set("geocode:denver, co", (39.74, -104.99), Duration::from_secs(60));
        assert_eq!(cache.get("geocode:denver, co"), Some((39.74, -104.99)));
        assert_eq!(cache.get("geocode:boulder, co"), None);
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let cache = MemoryLookupCache::new(8);
        cache.set("route:a", 1u32, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("route:a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entries_are_evicted_past_capacity() {
        let cache = MemoryLookupCache::new(2);
        cache.set("a", 1u32, Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(2));
        cache.set("b", 2u32, Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(2));
        cache.set("c", 3u32, Duration::from_secs(60));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }
}
