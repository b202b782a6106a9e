//! Shared Diesel error mapping for the repositories in this module.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Unique violations are not special-cased here; callers that care use
/// [`unique_violation`] first.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
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

/// Column named by a unique-constraint violation, if `error` is one.
///
/// Postgres names single-column unique constraints `<table>_<column>_key`, so
/// the constraint name is matched first. Without one, the column is read from
/// the `Key (<column>)=(...)` detail. Violations of any other constraint, such
/// as a primary key, yield `None`.
pub(crate) fn unique_violation(
    error: &DieselError,
    columns: &[&'static str],
) -> Option<&'static str> {
    let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = error else {
        return None;
    };
    if let Some(constraint) = info.constraint_name() {
        return columns
            .iter()
            .copied()
            .find(|column| constraint.ends_with(&format!("_{column}_key")));
    }
    let violated = info.details().and_then(detail_column)?;
    columns.iter().copied().find(|column| *column == violated)
}

fn detail_column(detail: &str) -> Option<&str> {
    let rest = detail.strip_prefix("Key (")?;
    let (column, _) = rest.split_once(")=(")?;
    Some(column)
}
