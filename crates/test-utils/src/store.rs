//! # Test State Store
//!
//! Wraps [`MemoryStateStore`] so saves and reads can be made to fail.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use credibil_oidc4vc::provider::StateStore;
use credibil_oidc4vc::store::{AuthorizeState, MemoryStateStore};

/// State store with injectable failures.
#[derive(Clone, Debug, Default)]
pub struct TestStore {
    store: MemoryStateStore,
    fail_save: Arc<AtomicBool>,
    fail_get: Arc<AtomicBool>,
}

impl TestStore {
    /// Make subsequent saves fail.
    pub fn fail_save(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    /// Make subsequent reads fail with a store error.
    pub fn fail_get(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }
}

impl StateStore for TestStore {
    async fn save_authorize_state(&self, op_state: &str, state: &AuthorizeState) -> Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            bail!("save error");
        }
        self.store.save_authorize_state(op_state, state).await
    }

    async fn get_authorize_state(&self, op_state: &str) -> Result<AuthorizeState> {
        if self.fail_get.load(Ordering::SeqCst) {
            bail!("get error");
        }
        self.store.get_authorize_state(op_state).await
    }
}
