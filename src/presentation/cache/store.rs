use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::trace;

use crate::application::ports::time::Clock;

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: DateTime<Utc>,
}

/// Process-local TTL map. Concurrent `set`s on one key resolve last write
/// wins; a stale entry lives at most until its TTL runs out or a write
/// invalidates it.
pub struct ResponseCache {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Returns a clone of the live value under `key`. Expired entries and
    /// entries holding some other type count as misses.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();
        let hit = self.entries.get(key).and_then(|entry| {
            if now >= entry.expires_at {
                None
            } else {
                entry.value.downcast_ref::<T>().cloned()
            }
        });

        if hit.is_none() {
            // only drop the entry if it is still the expired one we saw
            self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
            trace!(key, "cache miss");
        } else {
            trace!(key, "cache hit");
        }
        hit
    }

    pub fn set<T>(&self, key: impl Into<String>, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let key = key.into();
        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        trace!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
        self.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                expires_at,
            },
        );
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry whose key starts with `prefix` and returns how many
    /// went.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        trace!(prefix, removed, "cache prefix invalidated");
        removed
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::time::ManualClock;

    fn cache() -> (ResponseCache, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        (ResponseCache::new(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn entries_expire_after_their_ttl() {
        let (cache, clock) = cache();
        assert_eq!(cache.get::<String>("articles_page1_size10"), None);

        cache.set(
            "articles_page1_size10",
            "page one".to_string(),
            Duration::from_secs(300),
        );
        clock.advance(chrono::Duration::seconds(299));
        assert_eq!(
            cache.get::<String>("articles_page1_size10").as_deref(),
            Some("page one")
        );

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get::<String>("articles_page1_size10"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn wrong_type_is_a_miss() {
        let (cache, _) = cache();
        cache.set("tags_all", 7_u32, Duration::from_secs(60));
        assert_eq!(cache.get::<String>("tags_all"), None);
        assert_eq!(cache.get::<u32>("tags_all"), Some(7));
    }

    #[test]
    fn prefix_invalidation_leaves_other_keys() {
        let (cache, _) = cache();
        let ttl = Duration::from_secs(60);
        cache.set("articles_page1_size10", 1_u8, ttl);
        cache.set("articles_page2_size10", 2_u8, ttl);
        cache.set("article_42", 3_u8, ttl);

        assert_eq!(cache.invalidate_prefix("articles_"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate("article_42"));
        assert!(!cache.invalidate("article_42"));
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let (cache, clock) = cache();
        cache.set("short", 1_u8, Duration::from_secs(10));
        cache.set("long", 2_u8, Duration::from_secs(100));
        clock.advance(chrono::Duration::seconds(50));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get::<u8>("long"), Some(2));
    }
}
