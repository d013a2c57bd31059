//! # Mock Provider

pub mod datastore;
pub mod engine;
pub mod issuer;
pub mod store;

use credibil_oidc4vc::Proxy;

pub use self::datastore::MemoryDatastore;
pub use self::engine::{EngineCall, StubEngine};
pub use self::issuer::{IdpCall, IssuerCall, MockIdp, MockIssuer, Outcome};
pub use self::store::TestStore;

/// Public base URL the proxy is assumed to be served from.
pub const HOST: &str = "https://proxy.example.com";

/// Provider composed of test doubles.
pub type TestProvider = Proxy<StubEngine, TestStore, MockIssuer, MockIdp>;

/// Create a provider whose collaborators all succeed.
#[must_use]
pub fn provider() -> TestProvider {
    Proxy::new(
        StubEngine::default(),
        TestStore::default(),
        MockIssuer::default(),
        MockIdp::default(),
    )
}
