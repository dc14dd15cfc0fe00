use std::{fmt, sync::Arc};

use crate::{
    codec::{JsonCodec, MetadataCodec},
    constants::DEFAULT_BATCH_SIZE,
    error::Result,
    message::{Message, MessageRow},
    naming::TableNaming,
    persistence::{
        schema_adapter::{decode_row, insert_args, values_placeholders},
        sqlite::quote,
        OffsetsAdapter, SchemaAdapter,
    },
    query::{Query, ScanRow},
};

/// The default message table layout for SQLite.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS "sqlqueue_{topic}" (
///     "offset" INTEGER PRIMARY KEY AUTOINCREMENT,
///     "uuid" TEXT NOT NULL,
///     "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     "payload" BLOB DEFAULT NULL,
///     "metadata" BLOB DEFAULT NULL
/// )
/// ```
///
/// `AUTOINCREMENT` keeps SQLite from reusing the offset of a deleted last
/// row, so offsets are never handed out twice.
#[derive(Clone)]
pub struct DefaultSqliteSchema {
    table_naming: TableNaming,
    /// Number of messages selected per poll. Higher values increase the
    /// amount of redelivered messages after a crash.
    batch_size: usize,
    codec: Arc<dyn MetadataCodec>,
}

impl Default for DefaultSqliteSchema {
    fn default() -> Self {
        Self {
            table_naming: TableNaming::messages(),
            batch_size: DEFAULT_BATCH_SIZE,
            codec: Arc::new(JsonCodec),
        }
    }
}

impl DefaultSqliteSchema {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_table_naming(mut self, table_naming: TableNaming) -> Self {
        self.table_naming = table_naming;
        self
    }

    /// A batch size of 0 falls back to [DEFAULT_BATCH_SIZE].
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

    /// Quoted name of the message table of `topic`.
    pub fn messages_table(&self, topic: &str) -> Result<String> {
        Ok(quote(&self.table_naming.table_name(topic)?))
    }
}

impl fmt::Debug for DefaultSqliteSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultSqliteSchema")
            .field("table_naming", &self.table_naming)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl SchemaAdapter for DefaultSqliteSchema {
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>> {
        let table = self.messages_table(topic)?;
        Ok(vec![Query::raw(format!(
            r#"CREATE TABLE IF NOT EXISTS {table} (
    "offset" INTEGER PRIMARY KEY AUTOINCREMENT,
    "uuid" TEXT NOT NULL,
    "created_at" TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    "payload" BLOB DEFAULT NULL,
    "metadata" BLOB DEFAULT NULL
)"#
        ))])
    }

    fn insert(&self, topic: &str, messages: &[Message]) -> Result<Query> {
        let table = self.messages_table(topic)?;
        let args = insert_args(messages, self.codec.as_ref())?;
        Ok(Query::new(
            format!(
                r#"INSERT INTO {table} ("uuid", "payload", "metadata") VALUES {}"#,
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
                r#"SELECT "offset", "uuid", "created_at", "payload", "metadata" FROM {table}
WHERE "offset" > ({})
ORDER BY "offset" ASC
LIMIT {}"#,
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

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{error::Error, persistence::sqlite::DefaultSqliteOffsetsAdapter, query::Arg};

    #[test]
    fn init_schema_is_idempotent_ddl() {
        let queries = DefaultSqliteSchema::new().init_schema("orders").unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0]
            .sql
            .starts_with(r#"CREATE TABLE IF NOT EXISTS "sqlqueue_orders" ("#));
        assert!(queries[0].sql.contains("AUTOINCREMENT"));
        assert!(queries[0].args.is_empty());
    }

    #[test]
    fn insert_batch() {
        let query = DefaultSqliteSchema::new()
            .insert(
                "orders",
                &[
                    Message::new("a", &b"1"[..]),
                    Message::new("b", &b"2"[..]),
                ],
            )
            .unwrap();
        assert_eq!(
            query.sql,
            r#"INSERT INTO "sqlqueue_orders" ("uuid", "payload", "metadata") VALUES (?,?,?),(?,?,?)"#
        );
        assert_eq!(query.args.len(), 6);
        assert_eq!(query.args[4], Arg::Blob(Bytes::from_static(b"2")));
    }

    #[test]
    fn select_embeds_claim_bound() -> anyhow::Result<()> {
        let schema = DefaultSqliteSchema::new().with_batch_size(10);
        let offsets = DefaultSqliteOffsetsAdapter::new();
        let query = schema.select("orders", "billing", &offsets)?;
        let bound = offsets.claim_bound("orders", "billing")?;
        assert!(query.sql.contains(&format!(r#"WHERE "offset" > ({})"#, bound.sql)));
        assert!(query.sql.ends_with("LIMIT 10"));
        assert_eq!(query.args, vec![Arg::from("billing")]);
        Ok(())
    }

    #[test]
    fn zero_batch_size_uses_default() -> anyhow::Result<()> {
        let schema = DefaultSqliteSchema::new().with_batch_size(0);
        assert_eq!(schema.batch_size(), DEFAULT_BATCH_SIZE);
        let query = schema.select("orders", "billing", &DefaultSqliteOffsetsAdapter::new())?;
        assert!(query.sql.ends_with("LIMIT 100"));
        Ok(())
    }

    #[test]
    fn custom_table_naming() {
        let schema =
            DefaultSqliteSchema::new().with_table_naming(TableNaming::prefixed("queue_"));
        assert_eq!(schema.messages_table("orders").unwrap(), r#""queue_orders""#);
    }

    #[test]
    fn invalid_topic() {
        let err = DefaultSqliteSchema::new()
            .init_schema(r#"x"; DROP TABLE y; --"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTopic(_)));
    }
}
