//! Every topic owns two tables: one holding its messages and one holding the
//! cursors of its consumer groups. How those tables are named is a strategy
//! held in the adapter configuration.

use std::{fmt, sync::Arc};

use crate::{
    constants::{MESSAGES_TABLE_PREFIX, OFFSETS_TABLE_PREFIX},
    error::{Error, Result},
};

/// Maps a topic to the (unquoted) name of one of its tables.
#[derive(Clone)]
pub struct TableNaming {
    generate: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl TableNaming {
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            generate: Arc::new(generate),
        }
    }

    /// `{prefix}{topic}`
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new(move |topic| format!("{prefix}{topic}"))
    }

    /// Default naming of message tables.
    pub fn messages() -> Self {
        Self::prefixed(MESSAGES_TABLE_PREFIX)
    }

    /// Default naming of offset tables.
    pub fn offsets() -> Self {
        Self::prefixed(OFFSETS_TABLE_PREFIX)
    }

    /// Validates the topic and generates its table name.
    pub fn table_name(&self, topic: &str) -> Result<String> {
        validate_topic(topic)?;
        Ok((self.generate)(topic))
    }
}

impl fmt::Debug for TableNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableNaming").finish_non_exhaustive()
    }
}

/// Topics end up inside identifiers, so only a conservative alphabet is
/// accepted.
pub fn validate_topic(topic: &str) -> Result<()> {
    let valid = !topic.is_empty()
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '$'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidTopic(topic.to_string()))
    }
}
