//! # Types
//!
//! Requests and responses for the proxy's endpoints, the results produced by
//! the embedded `OAuth 2.0` engine, and messages exchanged with the Issuer.

mod authorization;
mod issuer;
mod oauth;

pub use self::authorization::*;
pub use self::issuer::*;
pub use self::oauth::*;
