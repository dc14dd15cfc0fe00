use crate::{
    error::Result,
    message::MessageRow,
    naming::TableNaming,
    persistence::{mysql::quote, OffsetsAdapter},
    query::{Arg, Query},
};

#[derive(Debug, Clone)]
pub struct DefaultMySqlOffsetsAdapter {
    table_naming: TableNaming,
}

impl Default for DefaultMySqlOffsetsAdapter {
    fn default() -> Self {
        Self {
            table_naming: TableNaming::offsets(),
        }
    }
}

impl DefaultMySqlOffsetsAdapter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_table_naming(mut self, table_naming: TableNaming) -> Self {
        self.table_naming = table_naming;
        self
    }

    pub fn offsets_table(&self, topic: &str) -> Result<String> {
        Ok(quote(&self.table_naming.table_name(topic)?))
    }
}

impl OffsetsAdapter for DefaultMySqlOffsetsAdapter {
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>> {
        let table = self.offsets_table(topic)?;
        Ok(vec![Query::raw(format!(
            "CREATE TABLE IF NOT EXISTS {table} (
    `consumer_group` VARCHAR(255) NOT NULL,
    `offset_acked` BIGINT,
    `offset_consumed` BIGINT NOT NULL,
    PRIMARY KEY (`consumer_group`)
)"
        ))])
    }

    fn claim_bound(&self, topic: &str, consumer_group: &str) -> Result<Query> {
        let table = self.offsets_table(topic)?;
        Ok(Query::new(
            format!(
                "SELECT COALESCE((SELECT `offset_acked` FROM {table} WHERE `consumer_group` = ? FOR UPDATE), 0)"
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
                "INSERT INTO {table} (`offset_consumed`, `consumer_group`) VALUES (?, ?)
ON DUPLICATE KEY UPDATE `offset_consumed` = VALUES(`offset_consumed`)"
            ),
            vec![Arg::Int(row.offset), Arg::from(consumer_group)],
        ))
    }

    fn acknowledge(&self, topic: &str, row: &MessageRow, consumer_group: &str) -> Result<Query> {
        let table = self.offsets_table(topic)?;
        Ok(Query::new(
            format!(
                "INSERT INTO {table} (`offset_consumed`, `offset_acked`, `consumer_group`) VALUES (?, ?, ?)
ON DUPLICATE KEY UPDATE `offset_consumed` = VALUES(`offset_consumed`), `offset_acked` = VALUES(`offset_acked`)"
            ),
            vec![
                Arg::Int(row.offset),
                Arg::Int(row.offset),
                Arg::from(consumer_group),
            ],
        ))
    }
}
