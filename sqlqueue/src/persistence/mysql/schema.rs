use std::{fmt, sync::Arc};

use crate::{
    codec::{JsonCodec, MetadataCodec},
    constants::DEFAULT_BATCH_SIZE,
    error::Result,
    message::{Message, MessageRow},
    naming::TableNaming,
    persistence::{
        mysql::quote,
        schema_adapter::{decode_row, insert_args, values_placeholders},
        OffsetsAdapter, SchemaAdapter,
    },
    query::{Query, ScanRow},
};

/// The default message table layout for MySQL and MariaDB.
///
/// The driver must hand `created_at` back as text in `%Y-%m-%d %H:%M:%S`
/// form, which is what `DATETIME` columns produce.
#[derive(Clone)]
pub struct DefaultMySqlSchema {
    table_naming: TableNaming,
    batch_size: usize,
    codec: Arc<dyn MetadataCodec>,
}

impl Default for DefaultMySqlSchema {
    fn default() -> Self {
        Self {
            table_naming: TableNaming::messages(),
            batch_size: DEFAULT_BATCH_SIZE,
            codec: Arc::new(JsonCodec),
        }
    }
}

impl DefaultMySqlSchema {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_table_naming(mut self, table_naming: TableNaming) -> Self {
        self.table_naming = table_naming;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_codec(mut self, codec: impl MetadataCodec) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn batch_size(&self) -> usize {
        if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        }
    }

    pub fn messages_table(&self, topic: &str) -> Result<String> {
        Ok(quote(&self.table_naming.table_name(topic)?))
    }
}

impl fmt::Debug for DefaultMySqlSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultMySqlSchema")
            .field("table_naming", &self.table_naming)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl SchemaAdapter for DefaultMySqlSchema {
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>> {
        let table = self.messages_table(topic)?;
        Ok(vec![Query::raw(format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    `offset` BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    `uuid` TEXT NOT NULL,
    `created_at` DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    `payload` LONGBLOB DEFAULT NULL,
    `metadata` BLOB DEFAULT NULL
)"
        ))])
    }

    fn insert(&self, topic: &str, messages: &[Message]) -> Result<Query> {
        let table = self.messages_table(topic)?;
        let args = insert_args(messages, self.codec.as_ref())?;
        Ok(Query::new(
            format!(
                "INSERT INTO {table} (`uuid`, `payload`, `metadata`) VALUES {}",
                values_placeholders(messages.len())
            ),
            args,
        ))
    }

    fn select(
        &self,
        topic: &str,
        consumer_group: &str,
        offsets: &dyn OffsetsAdapter,
    ) -> Result<Query> {
        let table = self.messages_table(topic)?;
        let bound = offsets.claim_bound(topic, consumer_group)?;
        Ok(Query::new(
            format!(
                "SELECT `offset`, `uuid`, `created_at`, `payload`, `metadata` FROM {table}
WHERE `offset` > ({})
ORDER BY `offset` ASC
LIMIT {}",
                bound.sql,
                self.batch_size()
            ),
            bound.args,
        ))
    }

    fn decode(&self, row: &dyn ScanRow) -> Result<MessageRow> {
        decode_row(row, self.codec.as_ref())
    }
}
