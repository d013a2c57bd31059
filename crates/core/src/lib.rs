//! # Core
//!
//! Building blocks shared by the authorization proxy, its embedded `OAuth`
//! engine and the server binary.

pub mod api;
pub mod datastore;
pub mod generate;
pub mod state;

pub use self::api::{Body, Handler, Headers, NoHeaders, Request, Response};
pub use self::datastore::Datastore;
pub use self::state::State;
