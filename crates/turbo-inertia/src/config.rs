//! Integration configuration and its resolution.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dev_server::{DevServer, DevServerLauncher, DevServerOptions, DevServerSource};
use crate::error::ConfigError;
use crate::shared::SharedData;

/// Environment variable holding the run mode.
pub const MODE_ENV_VAR: &str = "TURBO_ENV";

/// Process run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development: the asset server is wired in.
    #[default]
    Development,
    /// Production: assets are prebuilt, no asset server.
    Production,
}

impl Mode {
    /// Read the mode from `TURBO_ENV`.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(MODE_ENV_VAR).ok().as_deref())
    }

    /// Interpret a mode value; only `"production"` selects production.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Whether this is production mode.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Server-side rendering settings for the protocol core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SsrSettings {
    /// Whether pages are rendered on the server.
    #[serde(default)]
    pub enabled: bool,
    /// Module entry point used for server rendering.
    #[serde(default = "default_ssr_entry")]
    pub entry: String,
}

fn default_ssr_entry() -> String {
    "src/ssr.js".to_string()
}

impl Default for SsrSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            entry: default_ssr_entry(),
        }
    }
}

/// Caller-supplied protocol configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InertiaConfig {
    /// Root view template name.
    #[serde(default = "default_root_view")]
    pub root_view: String,
    /// Asset version; clients with a different version get a full reload.
    #[serde(default)]
    pub version: Option<String>,
    /// Server-side rendering settings.
    #[serde(default)]
    pub ssr: SsrSettings,
    /// Caller shared-data providers; these override the built-in ones.
    #[serde(skip)]
    pub shared_data: SharedData,
}

fn default_root_view() -> String {
    "app".to_string()
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            root_view: default_root_view(),
            version: None,
            ssr: SsrSettings::default(),
            shared_data: SharedData::new(),
        }
    }
}

impl InertiaConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root view template.
    pub fn with_root_view(mut self, root_view: impl Into<String>) -> Self {
        self.root_view = root_view.into();
        self
    }

    /// Set the asset version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the server-side rendering settings.
    pub fn with_ssr(mut self, ssr: SsrSettings) -> Self {
        self.ssr = ssr;
        self
    }

    /// Set the caller shared-data providers.
    pub fn with_shared_data(mut self, shared_data: SharedData) -> Self {
        self.shared_data = shared_data;
        self
    }
}

/// Options given when registering the integration.
#[derive(Debug, Default, Deserialize)]
pub struct PluginOptions {
    /// Protocol configuration. Required.
    #[serde(default)]
    pub inertia: Option<InertiaConfig>,
    /// Options for a managed dev server.
    #[serde(default)]
    pub dev_server: DevServerOptions,
    /// Where the dev server comes from.
    #[serde(skip)]
    pub dev_source: DevServerSource,
    /// Run mode; read from `TURBO_ENV` when unset.
    #[serde(default)]
    pub mode: Option<Mode>,
}

impl PluginOptions {
    /// Create options around a protocol configuration.
    pub fn new(inertia: InertiaConfig) -> Self {
        Self {
            inertia: Some(inertia),
            ..Default::default()
        }
    }

    /// Parse options from TOML.
    ///
    /// ```toml
    /// mode = "development"
    ///
    /// [inertia]
    /// root_view = "app"
    /// version = "1.0.3"
    ///
    /// [dev_server]
    /// root = "frontend"
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Force a run mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Use a dev server the caller already runs.
    pub fn with_external_dev_server(mut self, server: Arc<dyn DevServer>) -> Self {
        self.dev_source = DevServerSource::External(server);
        self
    }

    /// Launch and own a dev server at registration.
    pub fn with_dev_launcher(mut self, launcher: Arc<dyn DevServerLauncher>) -> Self {
        self.dev_source = DevServerSource::Managed(launcher);
        self
    }

    /// Set the managed dev server options.
    pub fn with_dev_options(mut self, options: DevServerOptions) -> Self {
        self.dev_server = options;
        self
    }

    /// Replace the caller shared-data providers, creating a default
    /// protocol configuration when none is set.
    pub fn with_shared_data(mut self, shared_data: SharedData) -> Self {
        self.inertia
            .get_or_insert_with(InertiaConfig::default)
            .shared_data = shared_data;
        self
    }
}

/// Immutable configuration built once at registration.
pub struct ResolvedConfig {
    root_view: String,
    version: Option<String>,
    ssr: SsrSettings,
    shared_data: SharedData,
    mode: Mode,
    dev_server: Option<Arc<dyn DevServer>>,
    owns_dev_server: bool,
}

impl ResolvedConfig {
    /// Root view template name.
    pub fn root_view(&self) -> &str {
        &self.root_view
    }

    /// Asset version.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Server-side rendering settings.
    pub fn ssr(&self) -> &SsrSettings {
        &self.ssr
    }

    /// Merged shared-data providers.
    pub fn shared_data(&self) -> &SharedData {
        &self.shared_data
    }

    /// Run mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Dev server handle, outside production.
    pub fn dev_server(&self) -> Option<&Arc<dyn DevServer>> {
        self.dev_server.as_ref()
    }

    /// Whether this integration launched the dev server itself.
    pub fn owns_dev_server(&self) -> bool {
        self.owns_dev_server
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("root_view", &self.root_view)
            .field("version", &self.version)
            .field("ssr", &self.ssr)
            .field("shared_data", &self.shared_data)
            .field("mode", &self.mode)
            .field("dev_server", &self.dev_server.is_some())
            .field("owns_dev_server", &self.owns_dev_server)
            .finish()
    }
}

/// Resolve caller options into the process-wide configuration.
///
/// Built-in `errors` and `flash` providers are installed first so caller
/// providers with the same key replace them. Outside production a managed
/// dev server is launched here, once.
pub async fn resolve_config(options: PluginOptions) -> Result<ResolvedConfig, ConfigError> {
    let PluginOptions {
        inertia,
        dev_server: dev_options,
        dev_source,
        mode,
    } = options;

    let inertia = inertia.ok_or_else(|| {
        ConfigError::InvalidArgument("Inertia configuration is required".to_string())
    })?;
    if inertia.root_view.trim().is_empty() {
        return Err(ConfigError::InvalidArgument(
            "root_view must not be empty".to_string(),
        ));
    }

    let mode = mode.unwrap_or_else(Mode::from_env);
    let shared_data = SharedData::defaults().merge(inertia.shared_data);

    let (dev_server, owns_dev_server) = if mode.is_production() {
        if !matches!(dev_source, DevServerSource::Disabled) {
            tracing::debug!("production mode; ignoring dev server");
        }
        (None, false)
    } else {
        match dev_source {
            DevServerSource::Disabled => {
                tracing::warn!("development mode without a dev server; assets will not be served");
                (None, false)
            }
            DevServerSource::External(server) => (Some(server), false),
            DevServerSource::Managed(launcher) => {
                let server = launcher.launch(&dev_options).await?;
                tracing::info!(app_type = %dev_options.app_type, "dev server launched");
                (Some(server), true)
            }
        }
    };

    Ok(ResolvedConfig {
        root_view: inertia.root_view,
        version: inertia.version,
        ssr: inertia.ssr,
        shared_data,
        mode,
        dev_server,
        owns_dev_server,
    })
}
