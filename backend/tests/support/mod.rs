//! Shared helpers for the embedded PostgreSQL integration suites.
//!
//! Each file under `backend/tests/` compiles as its own crate and pulls these
//! helpers in with `mod support;`. Not every suite uses every helper.

#[expect(unsafe_code, reason = "test-only FFI: libc flock/kill/atexit and env::set_var for the embedded cluster")]
pub mod cluster;
pub mod database;
pub mod seed;

pub use database::{TestDatabase, test_database};
