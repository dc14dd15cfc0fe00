use crate::error::Error;

/// Result codes signalling that another transaction holds the lock we need:
/// SQLite busy/locked (with their extended variants) plus the SQLSTATEs
/// servers use for serialization failures and deadlocks.
const CONFLICT_CODES: &[&str] = &["5", "6", "261", "262", "517", "773", "40001", "40P01"];

/// Whether `error` is the losing side of a race for a lock.
pub fn is_conflict(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => {
            let by_code = db
                .code()
                .map(|code| CONFLICT_CODES.contains(&code.as_ref()))
                .unwrap_or(false);
            let message = db.message();
            by_code || message.contains("database is locked") || message.contains("deadlock")
        }
        _ => false,
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        if is_conflict(&error) {
            Error::Conflict(Box::new(error))
        } else {
            Error::Database(Box::new(error))
        }
    }
}
