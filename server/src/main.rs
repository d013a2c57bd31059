//! OIDC4VC authorization proxy.
//!
//! Usage: `oidc4vc-proxy [settings-file]`. The settings file may also be set
//! with `OIDC4VC_CONFIG`. Log filtering follows `RUST_LOG`.

use std::path::PathBuf;

use anyhow::Result;
use server::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args().nth(1).or_else(|| std::env::var("OIDC4VC_CONFIG").ok());
    let settings = Settings::load(path.map(PathBuf::from).as_deref())?;

    // block until `ctrl-c`
    server::serve(&settings, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "listening for shutdown signal");
        }
    })
    .await
}
