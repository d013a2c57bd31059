//! An `OAuth 2.0` authorization proxy for [OpenID for Verifiable Credential
//! Issuance](https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html).
//!
//! The proxy sits between a Wallet, a Credential Issuer, and a third-party
//! Identity Provider. It presents a standard authorization server to the
//! Wallet while delegating user authentication to the Identity Provider the
//! Issuer nominates. The four-step flow (pushed authorization request,
//! authorization, Identity Provider redirect, token) is correlated by the
//! Issuer's `op_state`.
//!
//! Library users supply a [`provider::Provider`]: the embedded `OAuth 2.0`
//! engine, a correlation [`provider::StateStore`], and clients for the Issuer
//! and Identity Provider. [`Proxy`] composes them from individual parts.

pub mod client;
pub mod provider;
pub mod store;
pub mod types;

mod error;
mod handlers;
mod proxy;

pub use credibil_core::{datastore, state};

pub use self::error::Error;
pub use self::handlers::*;
pub use self::proxy::Proxy;
