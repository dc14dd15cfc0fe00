use crate::{
    error::Result,
    message::MessageRow,
    naming::TableNaming,
    persistence::{sqlite::quote, OffsetsAdapter},
    query::{Arg, Query},
};

/// Consumer group offsets for SQLite.
///
/// SQLite has no row level locks and no `FOR UPDATE`. Claims are serialized
/// by its database write lock instead: two transactions which both read the
/// same bound cannot both write, the second writer gets `SQLITE_BUSY` (or
/// `SQLITE_BUSY_SNAPSHOT` in WAL mode) on its
/// [mark_consumed](OffsetsAdapter::mark_consumed) and has to start over.
#[derive(Debug, Clone)]
pub struct DefaultSqliteOffsetsAdapter {
    table_naming: TableNaming,
}

impl Default for DefaultSqliteOffsetsAdapter {
    fn default() -> Self {
        Self {
            table_naming: TableNaming::offsets(),
        }
    }
}

impl DefaultSqliteOffsetsAdapter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_table_naming(mut self, table_naming: TableNaming) -> Self {
        self.table_naming = table_naming;
        self
    }

    /// Quoted name of the offsets table of `topic`.
    pub fn offsets_table(&self, topic: &str) -> Result<String> {
        Ok(quote(&self.table_naming.table_name(topic)?))
    }
}

impl OffsetsAdapter for DefaultSqliteOffsetsAdapter {
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>> {
        let table = self.offsets_table(topic)?;
        Ok(vec![Query::raw(format!(
            r#"CREATE TABLE IF NOT EXISTS {table} (
    "consumer_group" TEXT NOT NULL PRIMARY KEY,
    "offset_acked" INTEGER,
    "offset_consumed" INTEGER NOT NULL
)"#
        ))])
    }

    fn claim_bound(&self, topic: &str, consumer_group: &str) -> Result<Query> {
        let table = self.offsets_table(topic)?;
        Ok(Query::new(
            format!(
                r#"SELECT COALESCE((SELECT "offset_acked" FROM {table} WHERE "consumer_group" = ?), 0)"#
            ),
            vec![Arg::from(consumer_group)],
        ))
    }

    fn mark_consumed(
        &self,
        topic: &str,
        row: &MessageRow,
        consumer_group: &str,
    ) -> Result<Query> {
        let table = self.offsets_table(topic)?;
        Ok(Query::new(
            format!(
                r#"INSERT INTO {table} ("offset_consumed", "consumer_group") VALUES (?, ?)
ON CONFLICT("consumer_group") DO UPDATE SET "offset_consumed" = excluded."offset_consumed""#
            ),
            vec![Arg::Int(row.offset), Arg::from(consumer_group)],
        ))
    }

    fn acknowledge(&self, topic: &str, row: &MessageRow, consumer_group: &str) -> Result<Query> {
        let table = self.offsets_table(topic)?;
        Ok(Query::new(
            format!(
                r#"INSERT INTO {table} ("offset_consumed", "offset_acked", "consumer_group") VALUES (?, ?, ?)
ON CONFLICT("consumer_group") DO UPDATE SET "offset_consumed" = excluded."offset_consumed", "offset_acked" = excluded."offset_acked""#
            ),
            vec![
                Arg::Int(row.offset),
                Arg::Int(row.offset),
                Arg::from(consumer_group),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::message::Message;

    fn row(offset: i64) -> MessageRow {
        MessageRow {
            offset,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            message: Message::default(),
        }
    }

    #[test]
    fn claim_defaults_to_zero() {
        let query = DefaultSqliteOffsetsAdapter::new()
            .claim_bound("orders", "billing")
            .unwrap();
        assert_eq!(
            query.sql,
            r#"SELECT COALESCE((SELECT "offset_acked" FROM "sqlqueue_offsets_orders" WHERE "consumer_group" = ?), 0)"#
        );
        assert_eq!(query.args, vec![Arg::from("billing")]);
    }

    #[test]
    fn mark_consumed_only_touches_consumed() {
        let query = DefaultSqliteOffsetsAdapter::new()
            .mark_consumed("orders", &row(4), "billing")
            .unwrap();
        assert!(query.sql.contains(r#"ON CONFLICT("consumer_group")"#));
        assert!(!query.sql.contains("offset_acked"));
        assert_eq!(query.args, vec![Arg::Int(4), Arg::from("billing")]);
    }

    #[test]
    fn acknowledge_moves_both_watermarks() {
        let query = DefaultSqliteOffsetsAdapter::new()
            .acknowledge("orders", &row(4), "billing")
            .unwrap();
        assert!(query
            .sql
            .contains(r#""offset_acked" = excluded."offset_acked""#));
        assert_eq!(
            query.args,
            vec![Arg::Int(4), Arg::Int(4), Arg::from("billing")]
        );
    }

    #[test]
    fn no_setup_before_subscribing() {
        assert!(DefaultSqliteOffsetsAdapter::new()
            .before_subscribing("orders", "billing")
            .unwrap()
            .is_empty());
    }
}
