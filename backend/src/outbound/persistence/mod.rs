//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to the port's
//!   error type. Rows that no longer decode into domain values surface as
//!   query errors.
//!
//! # Example
//!
//! ```no_run
//! use dfds_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), dfds_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/dfds")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_api_key_repository;
mod diesel_basic_error_mapping;
mod diesel_blog_repository;
mod diesel_conversation_repository;
mod diesel_forum_repository;
mod diesel_profile_repository;
mod diesel_roadmap_repository;
mod diesel_startup_repository;
mod diesel_transaction_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod row_decoding;
mod schema;

pub use diesel_api_key_repository::DieselApiKeyRepository;
pub use diesel_blog_repository::DieselBlogRepository;
pub use diesel_conversation_repository::DieselConversationRepository;
pub use diesel_forum_repository::DieselForumRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_roadmap_repository::DieselRoadmapRepository;
pub use diesel_startup_repository::DieselStartupRepository;
pub use diesel_transaction_repository::DieselTransactionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, MIGRATIONS, PoolConfig, PoolError, run_migrations};
