//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers only parse requests, extract the [`Caller`](crate::domain::Caller)
//! and map results; permission checks and business rules live in the domain
//! services behind [`state::HttpState`].

pub mod accounts;
pub mod api_keys;
pub mod assistant;
pub mod blog;
pub mod caller;
pub mod equity;
pub mod error;
pub mod forum;
pub mod health;
pub mod idempotency;
pub mod messaging;
pub mod payments;
pub mod profiles;
pub mod roadmap;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod startups;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
