use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Shared key/value store the workflow stages read from and write to.
///
/// Values are stored as JSON so stages stay decoupled from each other's
/// concrete types. Cloning is cheap; all clones see the same data.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) {
        let value = serde_json::to_value(value).expect("value must serialize to JSON");
        self.entries.insert(key.into(), value);
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|entry| serde_json::from_value(entry.clone()).ok())
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|(_, value)| value)
    }
}
