//! Ports for the external key-value cache and the pub/sub message bus.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker connection error: {0}")]
    Connection(String),
    #[error("broker serialization error: {0}")]
    Serialization(String),
    #[error("broker backend error: {0}")]
    Backend(String),
}

pub type BrokerResult<T> = Result<T, BrokerError>;

/// Key-value cache with glob key enumeration.
#[async_trait]
pub trait KeyCache: Send + Sync {
    /// All keys matching a glob `pattern` (`*`, `?`, `[...]`, `\` escapes).
    async fn keys(&self, pattern: &str) -> BrokerResult<Vec<String>>;

    async fn get(&self, key: &str) -> BrokerResult<Option<String>>;

    /// Store `value` under `key`. A zero `ttl` stores it without expiry;
    /// backends with whole-second resolution round a sub-second `ttl` up.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> BrokerResult<()>;

    async fn delete(&self, key: &str) -> BrokerResult<()>;

    async fn health_check(&self) -> BrokerResult<()>;
}

/// Fire-and-forget publisher for a pub/sub channel.
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Publish `payload` on `channel`, returning how many subscribers received it.
    async fn publish(&self, channel: &str, payload: String) -> BrokerResult<u64>;
}

/// Serialize `payload` as JSON text and publish it on `channel`.
pub async fn publish_json<T>(
    publisher: &dyn ChannelPublisher,
    channel: &str,
    payload: &T,
) -> BrokerResult<u64>
where
    T: Serialize + ?Sized,
{
    let text = serde_json::to_string(payload)
        .map_err(|err| BrokerError::Serialization(err.to_string()))?;
    publisher.publish(channel, text).await
}
