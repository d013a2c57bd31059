//! # Correlation State
//!
//! Authorization state is written by the authorization endpoint and read back
//! when the Identity Provider redirects the user to the proxy. Entries are
//! keyed by the Issuer's `op_state` and expire after a configurable
//! time-to-live.
//!
//! Two stores are provided: [`MemoryStateStore`] for single-instance
//! deployments and [`DatastoreStateStore`] for any shared [`Datastore`].

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::Duration;
pub use credibil_core::datastore::Datastore;
use credibil_core::state::State;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::Error;
use crate::provider::StateStore;
use crate::types::AuthorizeResponse;

/// Default authorization state time-to-live, in seconds.
pub const DEFAULT_STATE_TTL_SECS: i64 = 900;

const OWNER: &str = "oidc4vc";
const PARTITION: &str = "authorize_state";

/// State saved between the authorization endpoint and the redirect endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthorizeState {
    /// The Issuer's correlation key.
    pub op_state: String,

    /// The Wallet's redirect URI.
    pub redirect_uri: String,

    /// The authorization response to deliver to the Wallet.
    pub response: AuthorizeResponse,
}

fn missing(op_state: &str) -> Error {
    Error::InvalidState(format!("no authorize state for `{op_state}`"))
}

/// In-memory state store.
#[derive(Clone, Debug)]
pub struct MemoryStateStore {
    ttl: Duration,
    states: Arc<RwLock<HashMap<String, State<AuthorizeState>>>>,
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_STATE_TTL_SECS))
    }
}

impl MemoryStateStore {
    /// Create a store whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl StateStore for MemoryStateStore {
    async fn save_authorize_state(&self, op_state: &str, state: &AuthorizeState) -> Result<()> {
        let mut states = self.states.write().await;
        states.retain(|_, s| !s.is_expired());
        states.insert(op_state.to_string(), State::new(state.clone(), self.ttl));
        Ok(())
    }

    async fn get_authorize_state(&self, op_state: &str) -> Result<AuthorizeState> {
        let states = self.states.read().await;
        match states.get(op_state) {
            Some(state) if !state.is_expired() => Ok(state.body.clone()),
            _ => Err(missing(op_state).into()),
        }
    }
}

/// State store backed by a [`Datastore`]. State is saved as JSON together
/// with its expiry.
#[derive(Clone, Debug)]
pub struct DatastoreStateStore<D> {
    datastore: D,
    ttl: Duration,
}

impl<D: Datastore> DatastoreStateStore<D> {
    /// Create a store whose entries expire after `ttl`.
    pub const fn new(datastore: D, ttl: Duration) -> Self {
        Self { datastore, ttl }
    }
}

impl<D: Datastore> StateStore for DatastoreStateStore<D> {
    async fn save_authorize_state(&self, op_state: &str, state: &AuthorizeState) -> Result<()> {
        let state = State::new(state, self.ttl);
        let data = serde_json::to_vec(&state).context("serializing state")?;
        self.datastore.put(OWNER, PARTITION, op_state, &data).await
    }

    async fn get_authorize_state(&self, op_state: &str) -> Result<AuthorizeState> {
        let Some(data) = self.datastore.get(OWNER, PARTITION, op_state).await? else {
            return Err(missing(op_state).into());
        };
        let state: State<AuthorizeState> =
            serde_json::from_slice(&data).context("deserializing state")?;
        if state.is_expired() {
            self.datastore.delete(OWNER, PARTITION, op_state).await?;
            return Err(missing(op_state).into());
        }
        Ok(state.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(code: &str) -> AuthorizeState {
        AuthorizeState {
            op_state: "opState".to_string(),
            redirect_uri: "https://wallet.example.com/cb".to_string(),
            response: AuthorizeResponse {
                code: code.to_string(),
                state: Some("opState".to_string()),
                scope: None,
            },
        }
    }

    #[tokio::test]
    async fn save_and_get() {
        let store = MemoryStateStore::default();
        store.save_authorize_state("opState", &state("code")).await.expect("should save");
        let saved = store.get_authorize_state("opState").await.expect("should get");
        assert_eq!(saved, state("code"));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = MemoryStateStore::default();
        store.save_authorize_state("opState", &state("first")).await.expect("should save");
        store.save_authorize_state("opState", &state("second")).await.expect("should save");
        let saved = store.get_authorize_state("opState").await.expect("should get");
        assert_eq!(saved.response.code, "second");
    }

    #[tokio::test]
    async fn missing_state() {
        let store = MemoryStateStore::default();
        let err = store.get_authorize_state("unknown").await.expect_err("should fail");
        assert!(matches!(Error::from(err), Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn expired_state() {
        let store = MemoryStateStore::new(Duration::seconds(-1));
        store.save_authorize_state("opState", &state("code")).await.expect("should save");
        let err = store.get_authorize_state("opState").await.expect_err("should fail");
        assert!(matches!(Error::from(err), Error::InvalidState(_)));
    }
}
