//! Shared data providers.
//!
//! Shared data is merged into every rendered page. Providers are plain
//! closures evaluated per request against that request's [`Flash`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use turbo_flash::{Flash, ERROR_KEY, SUCCESS_KEY};

/// Shared-data key for validation errors.
pub const ERRORS_PROP: &str = "errors";

/// Shared-data key for banner messages.
pub const FLASH_PROP: &str = "flash";

/// What a provider can see about the current request.
#[derive(Debug)]
pub struct SharedContext<'a> {
    /// The request's flash store.
    pub flash: &'a Flash,
    /// Request method.
    pub method: &'a str,
    /// Request url.
    pub url: &'a str,
}

/// A shared-data provider.
pub type SharedProvider = Arc<dyn Fn(&SharedContext<'_>) -> Value + Send + Sync>;

/// Mapping from prop name to provider.
#[derive(Clone, Default)]
pub struct SharedData {
    providers: BTreeMap<String, SharedProvider>,
}

impl SharedData {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The providers this integration always installs: `errors` and `flash`.
    pub fn defaults() -> Self {
        Self::new()
            .with(ERRORS_PROP, |ctx| ctx.flash.errors())
            .with(FLASH_PROP, |ctx| {
                json!({
                    ERROR_KEY: ctx.flash.message(ERROR_KEY),
                    SUCCESS_KEY: ctx.flash.message(SUCCESS_KEY),
                })
            })
    }

    /// Add a provider, replacing any provider with the same key.
    pub fn with<F>(mut self, key: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&SharedContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.insert(key, Arc::new(provider));
        self
    }

    /// Add a constant value.
    pub fn with_value(self, key: impl Into<String>, value: Value) -> Self {
        self.with(key, move |_| value.clone())
    }

    /// Insert a provider, replacing any provider with the same key.
    pub fn insert(&mut self, key: impl Into<String>, provider: SharedProvider) {
        self.providers.insert(key.into(), provider);
    }

    /// Overlay `other` on top of `self`; `other` wins on equal keys.
    pub fn merge(mut self, other: SharedData) -> Self {
        self.providers.extend(other.providers);
        self
    }

    /// Get a provider by key.
    pub fn get(&self, key: &str) -> Option<&SharedProvider> {
        self.providers.get(key)
    }

    /// Provider keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether there are no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Evaluate every provider.
    pub fn evaluate(&self, ctx: &SharedContext<'_>) -> Map<String, Value> {
        self.providers
            .iter()
            .map(|(key, provider)| (key.clone(), provider(ctx)))
            .collect()
    }
}

impl fmt::Debug for SharedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.providers.keys()).finish()
    }
}

/// Shared data bound to one request.
///
/// Built by the protocol init step from the resolved providers and the
/// request's flash store; handed to the protocol core for rendering.
#[derive(Debug, Clone)]
pub struct SharedProps {
    data: SharedData,
    flash: Flash,
    method: String,
    url: String,
}

impl SharedProps {
    /// Bind providers to a request.
    pub fn new(
        data: SharedData,
        flash: Flash,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            data,
            flash,
            method: method.into(),
            url: url.into(),
        }
    }

    /// Evaluate all providers.
    pub fn resolve(&self) -> Map<String, Value> {
        self.data.evaluate(&self.context())
    }

    /// Evaluate one provider.
    pub fn resolve_key(&self, key: &str) -> Option<Value> {
        let provider = self.data.get(key)?;
        Some(provider(&self.context()))
    }

    /// The request's flash store.
    pub fn flash(&self) -> &Flash {
        &self.flash
    }

    fn context(&self) -> SharedContext<'_> {
        SharedContext {
            flash: &self.flash,
            method: &self.method,
            url: &self.url,
        }
    }
}
