//! # Settings
//!
//! Settings are read from an optional file (TOML, YAML, or JSON, detected by
//! extension) and then from environment variables prefixed `OIDC4VC__`, with
//! `__` separating nested keys. For example, `OIDC4VC__ISSUER__URL` sets
//! `issuer.url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use config::{Config, Environment, File};
use credibil_oauth::{Client, EngineConfig};
use credibil_oidc4vc::store::DEFAULT_STATE_TTL_SECS;
use serde::Deserialize;

const ENV_PREFIX: &str = "OIDC4VC";

/// Proxy settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Address the server binds to.
    pub host_url: String,

    /// Public base URL of the proxy, used to build the redirect URI sent to
    /// Identity Providers. Required in production: when unset, it is derived
    /// from the client-supplied `Host` header over plain `http://`.
    pub host_url_external: Option<String>,

    /// API key required on all non-public routes. No check when unset.
    pub api_token: Option<String>,

    /// Authorization state time-to-live in seconds.
    pub state_ttl_secs: i64,

    /// Issuer interaction API.
    pub issuer: IssuerSettings,

    /// Embedded `OAuth 2.0` engine.
    pub oauth: OAuthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host_url: "0.0.0.0:8080".to_string(),
            host_url_external: None,
            api_token: None,
            state_ttl_secs: DEFAULT_STATE_TTL_SECS,
            issuer: IssuerSettings::default(),
            oauth: OAuthSettings::default(),
        }
    }
}

/// Issuer interaction API settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IssuerSettings {
    /// Base URL of the Issuer.
    pub url: String,

    /// API key sent to the Issuer as `X-API-Key`.
    pub api_token: Option<String>,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IssuerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            api_token: None,
            timeout_secs: 60,
        }
    }
}

impl IssuerSettings {
    /// Upstream request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Embedded engine settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OAuthSettings {
    /// JSON file holding an array of registered clients.
    pub clients_file: Option<PathBuf>,

    /// Lifespans and PKCE enforcement.
    #[serde(flatten)]
    pub engine: EngineConfig,
}

impl OAuthSettings {
    /// Load registered clients from `clients_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn clients(&self) -> Result<Vec<Client>> {
        let Some(path) = &self.clients_file else {
            tracing::warn!("no oauth clients configured");
            return Ok(vec![]);
        };
        let data = std::fs::read(path)
            .with_context(|| format!("reading clients file {}", path.display()))?;
        serde_json::from_slice(&data).context("parsing clients file")
    }
}

impl Settings {
    /// Load settings from `path`, if given, overlaid with environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or any value fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()
            .context("loading settings")?;
        config.try_deserialize().context("parsing settings")
    }

    /// Authorization state time-to-live.
    #[must_use]
    pub fn state_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.state_ttl_secs)
    }
}
