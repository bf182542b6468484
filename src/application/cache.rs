use std::sync::Arc;

use tracing::debug;

use crate::application::broker::{BrokerError, KeyCache};

/// Pattern matching every key.
pub const ALL_KEYS_PATTERN: &str = "*";

/// Key enumeration against the external cache. A missing or empty pattern
/// means every key.
///
/// Backend failures are returned unchanged; nothing is retried.
#[derive(Clone)]
pub struct CacheLookupService {
    cache: Arc<dyn KeyCache>,
}

impl CacheLookupService {
    pub fn new(cache: Arc<dyn KeyCache>) -> Self {
        Self { cache }
    }

    pub async fn get_all_keys(&self, pattern: Option<&str>) -> Result<Vec<String>, BrokerError> {
        self.lookup("get_all_keys", pattern).await
    }

    pub async fn get_key(&self, pattern: Option<&str>) -> Result<Vec<String>, BrokerError> {
        self.lookup("get_key", pattern).await
    }

    pub async fn health_check(&self) -> Result<(), BrokerError> {
        self.cache.health_check().await
    }

    async fn lookup(
        &self,
        op: &'static str,
        pattern: Option<&str>,
    ) -> Result<Vec<String>, BrokerError> {
        let pattern = pattern
            .filter(|pattern| !pattern.is_empty())
            .unwrap_or(ALL_KEYS_PATTERN);
        let mut keys = self.cache.keys(pattern).await?;
        keys.sort();
        debug!(
            target = "application::cache",
            op,
            pattern,
            matched = keys.len(),
            "cache key lookup"
        );
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::infra::memory::InMemoryBroker;

    async fn seeded() -> CacheLookupService {
        let broker = Arc::new(InMemoryBroker::new());
        for key in ["config", "session:1", "session:2"] {
            broker
                .set(key, "v", Duration::from_secs(60))
                .await
                .unwrap();
        }
        CacheLookupService::new(broker)
    }

    #[tokio::test]
    async fn default_pattern_returns_every_key() {
        let service = seeded().await;

        let keys = service.get_all_keys(None).await.unwrap();

        assert_eq!(keys, vec!["config", "session:1", "session:2"]);
    }

    #[tokio::test]
    async fn empty_pattern_means_every_key() {
        let service = seeded().await;

        let keys = service.get_key(Some("")).await.unwrap();

        assert_eq!(keys, service.get_all_keys(None).await.unwrap());
        assert_eq!(keys.len(), 3);
    }

    #[tokio::test]
    async fn unmatched_pattern_returns_empty_list() {
        let service = seeded().await;

        assert!(service.get_all_keys(Some("nomatch*")).await.unwrap().is_empty());
        assert!(service.get_key(Some("nomatch*")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn both_lookups_share_the_pattern_contract() {
        let service = seeded().await;

        let all = service.get_all_keys(Some("session:*")).await.unwrap();
        let key = service.get_key(Some("session:*")).await.unwrap();

        assert_eq!(all, vec!["session:1", "session:2"]);
        assert_eq!(all, key);
    }
}
