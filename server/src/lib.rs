//! # Authorization Proxy Server
//!
//! Serves the OIDC4VC authorization proxy over HTTP using the in-memory
//! `OAuth 2.0` engine, an in-memory correlation store, and HTTP clients for
//! the Issuer and Identity Providers.

pub mod api_key;
pub mod config;
pub mod http;
pub mod router;

use anyhow::{Context as _, Result};
use credibil_oauth::MemoryEngine;
use credibil_oidc4vc::Proxy;
use credibil_oidc4vc::client::{IdpClient, IssuerClient};
use credibil_oidc4vc::store::MemoryStateStore;
use tokio::net::TcpListener;

pub use self::config::Settings;
pub use self::router::{AppState, router};

/// The provider served by the proxy.
///
/// Correlation state is held in process memory, so the binary must run as a
/// single instance. Multi-instance deployments embed `credibil-oidc4vc` with a
/// [`credibil_oidc4vc::store::DatastoreStateStore`] over a shared
/// [`credibil_oidc4vc::datastore::Datastore`].
pub type ProxyProvider = Proxy<MemoryEngine, MemoryStateStore, IssuerClient, IdpClient>;

/// Build handler state from settings.
///
/// # Errors
///
/// Returns an error if registered clients cannot be loaded or an HTTP client
/// cannot be built.
pub fn state(settings: &Settings) -> Result<AppState> {
    let engine = MemoryEngine::new(settings.oauth.engine.clone(), settings.oauth.clients()?);
    let store = MemoryStateStore::new(settings.state_ttl());

    let mut issuer = IssuerClient::new(&settings.issuer.url, settings.issuer.timeout())
        .context("building issuer client")?;
    if let Some(api_token) = &settings.issuer.api_token {
        issuer = issuer.api_key(api_token);
    }
    let idp = IdpClient::new(settings.issuer.timeout()).context("building idp client")?;

    if settings.host_url_external.is_none() {
        tracing::warn!(
            "`host_url_external` is not set: Identity Provider redirect URIs will use \
             `http://` and the request's Host header"
        );
    }

    Ok(AppState {
        provider: Proxy::new(engine, store, issuer, idp),
        host_url_external: settings.host_url_external.clone(),
    })
}

/// Serve the proxy until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(
    settings: &Settings, shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let router = router(state(settings)?, settings.api_token.clone());

    let listener = TcpListener::bind(&settings.host_url)
        .await
        .with_context(|| format!("binding {}", settings.host_url))?;
    tracing::info!("listening on {}", settings.host_url);

    axum::serve(listener, router).with_graceful_shutdown(shutdown).await.context("serving")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_settings() {
        let settings = Settings {
            host_url_external: Some("https://proxy.example.com".to_string()),
            ..Settings::default()
        };
        let state = state(&settings).expect("should build state");
        assert_eq!(state.host_url_external.as_deref(), Some("https://proxy.example.com"));
    }
}
