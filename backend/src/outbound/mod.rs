//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **realtime**: HTTP publisher for the hosted pub/sub service
//! - **assistant**: OpenAI-compatible chat completion client
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod assistant;
pub mod persistence;
pub mod realtime;
