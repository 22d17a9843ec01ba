//! Shared Diesel error mapping for repository adapters.
//!
//! Every repository port error has `Connection` and `Query` variants; these
//! helpers take the matching constructors so each adapter only adds its own
//! conflict handling.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Driver messages are logged at debug level and never surface in the
/// returned error.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique constraint violation.
pub fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Map a unique violation with `conflict`, everything else with the basic
/// query/connection mapping.
pub fn map_conflicting_diesel_error<E, F, Q, C>(
    error: DieselError,
    conflict: F,
    query: Q,
    connection: C,
) -> E
where
    F: FnOnce() -> E,
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    if is_unique_violation(&error) {
        debug!("unique constraint violated");
        return conflict();
    }
    map_basic_diesel_error(error, query, connection)
}
