//! Key/value store backing the token cache.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// String key/value store with per-entry lifetime and tag-based
/// invalidation.
///
/// Hosts that already run a shared cache plug it in here; the in-process
/// [`InMemoryCacheStore`] is the default. Callers never hold a lock across
/// `get` and `set`.
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry. Expired entries are never returned.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`, replacing any existing entry.
    /// A zero `ttl` stores nothing observable.
    fn set(&self, key: &str, value: String, tags: &[&str], ttl: Duration);

    fn remove(&self, key: &str);

    /// Drop every entry carrying `tag`.
    fn flush_by_tag(&self, tag: &str);
}

#[derive(Debug)]
struct Entry {
    value: String,
    tags: Vec<String>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local [`CacheStore`] on top of [`DashMap`].
///
/// Expiry uses the tokio clock, so paused-time tests can advance it.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: String, tags: &[&str], ttl: Duration) {
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            tracing::warn!(key, ?ttl, "cache lifetime out of range; entry not stored");
            return;
        };
        let entry = Entry {
            value,
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            expires_at,
        };
        self.entries.insert(key.to_owned(), entry);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn flush_by_tag(&self, tag: &str) {
        self.entries
            .retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn entry_lives_until_ttl() {
        let store = InMemoryCacheStore::new();
        store.set("k", "v".to_owned(), &[], HOUR);

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert_eq!(store.get("k").as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("k"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_is_never_returned() {
        let store = InMemoryCacheStore::new();
        store.set("k", "v".to_owned(), &[], Duration::ZERO);
        assert_eq!(store.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_previous_value() {
        let store = InMemoryCacheStore::new();
        store.set("k", "old".to_owned(), &[], HOUR);
        store.set("k", "new".to_owned(), &[], HOUR);
        assert_eq!(store.get("k").as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn flush_by_tag_only_drops_tagged_entries() {
        let store = InMemoryCacheStore::new();
        store.set("a", "1".to_owned(), &["azure"], HOUR);
        store.set("b", "2".to_owned(), &["azure", "other"], HOUR);
        store.set("c", "3".to_owned(), &["other"], HOUR);

        store.flush_by_tag("azure");

        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), None);
        assert_eq!(store.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn remove_drops_entry() {
        let store = InMemoryCacheStore::new();
        store.set("k", "v".to_owned(), &[], HOUR);
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
