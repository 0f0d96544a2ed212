//! Classification of PostgreSQL errors.

/// Unique constraint on `urls.short_code`.
pub const SHORT_CODE_CONSTRAINT: &str = "urls_short_code_key";

/// Unique constraint on `api_keys.key_hash`.
pub const KEY_HASH_CONSTRAINT: &str = "api_keys_key_hash_key";

/// Returns true if `e` is a unique violation on the short code column.
///
/// This is how a lost race between two concurrent creations of the same code
/// shows up at insert time.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    is_unique_violation_on(e, SHORT_CODE_CONSTRAINT)
}

pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
}
