//! Per-request session bag.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Mutable key-value bag owned by the session layer.
///
/// A session layer loads the bag, inserts it into the request extensions
/// and persists it after the response. Clones share the same data, so two
/// in-flight requests of the same session see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct Session {
    data: Arc<Mutex<Map<String, Value>>>,
}

impl Session {
    /// Create an empty session bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session bag from previously stored data.
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.lock().insert(key.into(), value)
    }

    /// Remove a value by key.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.lock().remove(key)
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Run `f` with exclusive access to the bag.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        f(&mut self.data.lock())
    }

    /// Copy of the current bag contents, e.g. for persistence.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.data.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_insert_get_remove() {
        let session = Session::new();
        assert!(session.insert("cart", json!(3)).is_none());

        assert_eq!(session.get("cart"), Some(json!(3)));
        assert!(session.contains_key("cart"));
        assert_eq!(session.remove("cart"), Some(json!(3)));
        assert!(session.get("cart").is_none());
    }

    #[test]
    fn test_session_clones_share_data() {
        let session = Session::new();
        let other = session.clone();
        other.insert("user", json!("grace"));

        assert_eq!(session.get("user"), Some(json!("grace")));
    }

    #[test]
    fn test_session_with_mut() {
        let mut stored = Map::new();
        stored.insert("visits".to_string(), json!(1));
        let session = Session::from_map(stored);

        session.with_mut(|data| {
            data.insert("visits".to_string(), json!(2));
        });

        assert_eq!(session.snapshot().get("visits"), Some(&json!(2)));
    }
}
