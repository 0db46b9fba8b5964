use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// Short-TTL cache for expensive aggregate reads (site settings, tag
/// lists, stats). A miss means the caller goes to the store; the cache is
/// never the source of truth.
pub struct ReadCache {
    default_ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

struct Entry {
    expires_at: Instant,
    value: Value,
}

impl ReadCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self { default_ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    pub async fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.write().await;
        // Expired entries for other keys get dropped opportunistically.
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(key.to_string(), Entry { expires_at: now + ttl, value });
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = ReadCache::new(Duration::from_secs(60));
        cache.set_with_ttl("k", json!(1), Duration::from_millis(10)).await;
        assert_eq!(cache.get("k").await, Some(json!(1)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_entries() {
        let cache = ReadCache::new(Duration::from_secs(60));
        cache.set("k", json!("v")).await;
        cache.invalidate("k").await;
        assert_eq!(cache.get("k").await, None);
    }
}
