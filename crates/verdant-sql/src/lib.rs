pub mod alerts;
pub mod devices;
pub mod farms;
pub mod users;

/// Whether this store error is a unique-key violation, surfaced by
/// Postgres as SQLSTATE 23505. Callers map it to a conflict failure.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Whether this store error is a foreign-key violation (SQLSTATE 23503),
/// raised when a write references a row that does not exist.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23503"),
        _ => false,
    }
}
