//! Single-process cache and pub/sub backend with Redis-compatible semantics.
//!
//! Keys expire lazily on read. Channels are broadcast channels: a message
//! published while nobody is subscribed is dropped.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::debug;

use crate::application::broker::{BrokerResult, ChannelPublisher, KeyCache};

const CHANNEL_CAPACITY: usize = 256;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Default)]
pub struct InMemoryBroker {
    entries: RwLock<HashMap<String, Entry>>,
    channels: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `channel`; only messages published after this call are received.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        let mut channels = self.channels.lock().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl KeyCache for InMemoryBroker {
    async fn keys(&self, pattern: &str) -> BrokerResult<Vec<String>> {
        let now = Instant::now();
        let guard = self.entries.read().await;
        Ok(guard
            .iter()
            .filter(|(key, entry)| entry.is_live(now) && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn get(&self, key: &str) -> BrokerResult<Option<String>> {
        let now = Instant::now();
        let guard = self.entries.read().await;
        Ok(guard
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> BrokerResult<()> {
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        let mut guard = self.entries.write().await;
        guard.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> BrokerResult<()> {
        let mut guard = self.entries.write().await;
        guard.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> BrokerResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ChannelPublisher for InMemoryBroker {
    async fn publish(&self, channel: &str, payload: String) -> BrokerResult<u64> {
        let channels = self.channels.lock().await;
        let delivered = match channels.get(channel) {
            // `send` only fails when there are no receivers.
            Some(sender) => sender.send(payload).unwrap_or(0) as u64,
            None => 0,
        };
        debug!(channel, delivered, "in-memory publish");
        Ok(delivered)
    }
}

/// Redis-style glob match: `*`, `?`, `[abc]`, `[^abc]`, `[a-z]` and `\` escapes.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, &text)
}

fn match_from(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Position to resume from after the most recent `*`.
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    star = Some((p, t));
                    p += 1;
                    continue;
                }
                '?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                '[' => {
                    if let Some((true, next)) = match_class(pattern, p, text[t]) {
                        p = next;
                        t += 1;
                        continue;
                    }
                }
                '\\' if p + 1 < pattern.len() => {
                    if pattern[p + 1] == text[t] {
                        p += 2;
                        t += 1;
                        continue;
                    }
                }
                literal => {
                    if literal == text[t] {
                        p += 1;
                        t += 1;
                        continue;
                    }
                }
            }
        }

        match star {
            Some((star_p, star_t)) => {
                p = star_p + 1;
                t = star_t + 1;
                star = Some((star_p, star_t + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// Match `c` against the class opening at `pattern[start] == '['`.
/// Returns whether it matched and the index just past the closing `]`.
fn match_class(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = matches!(pattern.get(i), Some('^'));
    if negate {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    while i < pattern.len() {
        let current = pattern[i];
        if current == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;

        if current == '\\' && i + 1 < pattern.len() {
            matched |= pattern[i + 1] == c;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == '-' && pattern[i + 2] != ']' {
            let (lo, hi) = if current <= pattern[i + 2] {
                (current, pattern[i + 2])
            } else {
                (pattern[i + 2], current)
            };
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= current == c;
            i += 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_wildcards() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("todo:*", "todo:list"));
        assert!(!glob_match("todo:*", "session:1"));
        assert!(glob_match("h?llo", "hello"));
        assert!(!glob_match("h?llo", "hllo"));
        assert!(glob_match("*:list", "todo:list"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
        assert!(!glob_match("nomatch*", "todo:list"));
    }

    #[test]
    fn glob_classes_and_escapes() {
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("key[0-9]", "key7"));
        assert!(!glob_match("key[0-9]", "keyx"));
        assert!(glob_match(r"literal\*", "literal*"));
        assert!(!glob_match(r"literal\*", "literalX"));
        assert!(!glob_match("broken[ab", "brokena"));
    }

    #[tokio::test]
    async fn keys_skip_expired_entries() {
        let broker = InMemoryBroker::new();
        broker.set("short", "1", Duration::from_millis(1)).await.unwrap();
        broker.set("forever", "2", Duration::ZERO).await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(broker.keys("*").await.unwrap(), vec!["forever".to_string()]);
        assert_eq!(broker.get("short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let broker = InMemoryBroker::new();
        broker.set("k", "v", Duration::ZERO).await.unwrap();

        broker.delete("k").await.unwrap();

        assert!(broker.keys("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let broker = InMemoryBroker::new();

        let delivered = broker.publish("todo", "{}".into()).await.unwrap();
        assert_eq!(delivered, 0);

        let mut late = broker.subscribe("todo").await;
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let broker = InMemoryBroker::new();
        let mut first = broker.subscribe("todo").await;
        let mut second = broker.subscribe("todo").await;
        let mut other = broker.subscribe("other").await;

        let delivered = broker.publish("todo", "hello".into()).await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(first.recv().await.unwrap(), "hello");
        assert_eq!(second.recv().await.unwrap(), "hello");
        assert!(other.try_recv().is_err());
    }
}
