use std::collections::HashMap;

use thiserror::Error;

use crate::topic::catalog::Grade;

pub const MAX_RECENT_TOPICS: usize = 5;

const KEY_PREFIX: &str = "recentTopics_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode recent topics: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to persist {key}: {reason}")]
    Persist { key: String, reason: String },
}

/// String key-value storage with the semantics of a browser's local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }
}

/// Per-grade most-recently-used topic lists.
pub trait RecentTopicsStore {
    fn read(&self, grade: Grade) -> Vec<String>;
    fn write(&mut self, grade: Grade, topics: &[String]) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> RecentTopicsStore for T {
    fn read(&self, grade: Grade) -> Vec<String> {
        decode(self.get_item(&storage_key(grade)).as_deref())
    }

    fn write(&mut self, grade: Grade, topics: &[String]) -> Result<(), StoreError> {
        let value = serde_json::to_string(topics)?;
        self.set_item(&storage_key(grade), &value)
    }
}

pub fn storage_key(grade: Grade) -> String {
    format!("{KEY_PREFIX}{grade}")
}

/// Move `topic` to the front, drop its older occurrence, keep at most
/// [`MAX_RECENT_TOPICS`].
pub fn remember(recent: &[String], topic: &str) -> Vec<String> {
    std::iter::once(topic.to_string())
        .chain(recent.iter().filter(|t| t.as_str() != topic).cloned())
        .take(MAX_RECENT_TOPICS)
        .collect()
}

/// Decode a stored value. Anything malformed reads as an empty list; hand-edited
/// values are normalized so the length and uniqueness invariants always hold.
fn decode(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let parsed: Vec<String> = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("discarding malformed recent topics ({e})");
            return Vec::new();
        }
    };

    let mut topics: Vec<String> = Vec::with_capacity(MAX_RECENT_TOPICS);
    for topic in parsed {
        if topics.len() == MAX_RECENT_TOPICS {
            break;
        }
        if topic.trim().is_empty() || topics.contains(&topic) {
            continue;
        }
        topics.push(topic);
    }
    topics
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
