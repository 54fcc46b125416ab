//! The flash store.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use turbo_host::Session;

use crate::FlashError;

/// Session field holding the flash bag.
pub const FLASH_FIELD: &str = "flash";

/// Key for per-field validation errors.
pub const ERRORS_KEY: &str = "errors";

/// Key for the error banner message.
pub const ERROR_KEY: &str = "error";

/// Key for the success banner message.
pub const SUCCESS_KEY: &str = "success";

/// Request-scoped view of the session's flash messages.
///
/// The view is a snapshot taken at [`Flash::attach`]. Writes go to both the
/// snapshot and the session, so later requests see them while requests
/// already in flight keep the state they attached with.
#[derive(Debug, Clone)]
pub struct Flash {
    session: Session,
    view: Arc<RwLock<Map<String, Value>>>,
}

impl Flash {
    /// Attach to the session bag, creating `session.flash` when missing.
    ///
    /// Fails with [`FlashError::MissingDependency`] when no session layer ran.
    pub fn attach(session: Option<&Session>) -> Result<Self, FlashError> {
        let session = session.ok_or_else(|| {
            FlashError::MissingDependency("flash requires session middleware".to_string())
        })?;

        let snapshot = session.with_mut(|data| {
            let existing = match data.get(FLASH_FIELD) {
                Some(Value::Object(map)) => Some(map.clone()),
                Some(other) => {
                    tracing::warn!(found = %other, "replacing non-object session flash field");
                    None
                }
                None => None,
            };

            match existing {
                Some(map) => map,
                None => {
                    data.insert(FLASH_FIELD.to_string(), Value::Object(Map::new()));
                    Map::new()
                }
            }
        });

        Ok(Self {
            session: session.clone(),
            view: Arc::new(RwLock::new(snapshot)),
        })
    }

    /// Peek at a flash value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.view.read().get(key).cloned()
    }

    /// Store a flash value for this and following requests.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.view.write().insert(key.clone(), value.clone());
        self.session.with_mut(|data| {
            with_flash_field(data, |flash| flash.insert(key, value));
        });
    }

    /// Remove a flash value, returning it.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.session.with_mut(|data| {
            with_flash_field(data, |flash| flash.remove(key));
        });
        self.view.write().remove(key)
    }

    /// Drop every flash value.
    pub fn clear(&self) {
        self.view.write().clear();
        self.session
            .with_mut(|data| with_flash_field(data, |flash| flash.clear()));
    }

    /// Keys currently visible to this request.
    pub fn keys(&self) -> Vec<String> {
        self.view.read().keys().cloned().collect()
    }

    /// Whether this request sees no flash values.
    pub fn is_empty(&self) -> bool {
        self.view.read().is_empty()
    }

    /// Validation errors keyed by field; `{}` when none were flashed.
    pub fn errors(&self) -> Value {
        match self.get(ERRORS_KEY) {
            Some(Value::Object(errors)) => Value::Object(errors),
            _ => Value::Object(Map::new()),
        }
    }

    /// A banner message; `null` when not flashed.
    pub fn message(&self, key: &str) -> Value {
        self.get(key).unwrap_or(Value::Null)
    }
}

fn with_flash_field<R>(
    data: &mut Map<String, Value>,
    f: impl FnOnce(&mut Map<String, Value>) -> R,
) -> R {
    match data.get_mut(FLASH_FIELD) {
        Some(Value::Object(map)) => f(map),
        _ => {
            let mut map = Map::new();
            let result = f(&mut map);
            data.insert(FLASH_FIELD.to_string(), Value::Object(map));
            result
        }
    }
}
