//! # State
//!
//! State is used to persist request information between steps in a flow.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// State wraps a body with the time after which it should no longer be
/// honoured.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct State<T> {
    /// Body holds data relevant to the current state.
    pub body: T,

    /// Time state should expire.
    pub expires_at: DateTime<Utc>,
}

impl<T> State<T> {
    /// Create state that expires `ttl` from now.
    pub fn new(body: T, ttl: Duration) -> Self {
        Self {
            body,
            expires_at: Utc::now() + ttl,
        }
    }

    /// Determines whether state has expired or not.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.signed_duration_since(Utc::now()).num_milliseconds() < 0
    }
}
