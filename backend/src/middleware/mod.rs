//! Actix middleware shared by every route.
//!
//! [`Trace`] assigns each request a trace id, exposes it to handlers through
//! a task-local and echoes it in the `trace-id` response header.

pub mod trace;

pub use trace::Trace;
