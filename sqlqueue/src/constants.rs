use std::time::Duration;

/// Rows fetched per poll when no batch size is configured.
///
/// Larger batches mean fewer round trips but a wider window of messages to
/// redeliver after a crash, as nothing in a batch is committed before the
/// whole batch has been handled.
pub const DEFAULT_BATCH_SIZE: usize = 100;

pub const MESSAGES_TABLE_PREFIX: &str = "sqlqueue_";
pub const OFFSETS_TABLE_PREFIX: &str = "sqlqueue_offsets_";

/// Sleep between polls which returned no messages.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Sleep after a failed poll (conflict, handler or decode error).
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Formats accepted for `created_at` besides RFC 3339: the one of
/// `CURRENT_TIMESTAMP` and ISO 8601 without an offset, both with optional
/// fractional seconds.
pub const CREATED_AT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
