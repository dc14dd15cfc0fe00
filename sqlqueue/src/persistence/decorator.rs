use std::{fmt, sync::Arc};

use crate::{
    error::Result,
    message::{Message, MessageRow},
    persistence::{IsolationLevel, OffsetsAdapter, SchemaAdapter},
    query::{Query, ScanRow},
};

type InitSchemaFn = Arc<dyn Fn(&str) -> Result<Vec<Query>> + Send + Sync>;
type InsertFn = Arc<dyn Fn(&str, &[Message]) -> Result<Query> + Send + Sync>;
type SelectFn = Arc<dyn Fn(&str, &str, &dyn OffsetsAdapter) -> Result<Query> + Send + Sync>;
type DecodeFn = Arc<dyn Fn(&dyn ScanRow) -> Result<MessageRow> + Send + Sync>;

/// Wraps a [SchemaAdapter], replacing some of its operations.
///
/// Every operation without an override is delegated to the wrapped adapter.
///
/// ```
/// use sqlqueue::{sqlite::DefaultSqliteSchema, Query, SchemaAdapter, SchemaDecorator};
///
/// let base = DefaultSqliteSchema::new();
/// let index_base = base.clone();
/// let schema = SchemaDecorator::new(base).with_init_schema(move |topic| {
///     let mut queries = index_base.init_schema(topic)?;
///     queries.push(Query::raw(format!(
///         "CREATE INDEX IF NOT EXISTS \"{topic}_uuid\" ON {} (\"uuid\")",
///         index_base.messages_table(topic)?
///     )));
///     Ok(queries)
/// });
/// assert_eq!(schema.init_schema("orders").unwrap().len(), 2);
/// ```
#[derive(Clone)]
pub struct SchemaDecorator<S> {
    inner: S,
    init_schema: Option<InitSchemaFn>,
    insert: Option<InsertFn>,
    select: Option<SelectFn>,
    decode: Option<DecodeFn>,
}

impl<S: SchemaAdapter> SchemaDecorator<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            init_schema: None,
            insert: None,
            select: None,
            decode: None,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Replace the table layout.
    pub fn with_init_schema<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<Query>> + Send + Sync + 'static,
    {
        self.init_schema = Some(Arc::new(f));
        self
    }

    pub fn with_insert<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[Message]) -> Result<Query> + Send + Sync + 'static,
    {
        self.insert = Some(Arc::new(f));
        self
    }

    pub fn with_select<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &dyn OffsetsAdapter) -> Result<Query> + Send + Sync + 'static,
    {
        self.select = Some(Arc::new(f));
        self
    }

    /// Replace how selected rows become messages.
    pub fn with_decode<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn ScanRow) -> Result<MessageRow> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(f));
        self
    }
}

impl<S: SchemaAdapter> SchemaAdapter for SchemaDecorator<S> {
    fn init_schema(&self, topic: &str) -> Result<Vec<Query>> {
        match &self.init_schema {
            Some(f) => f(topic),
            None => self.inner.init_schema(topic),
        }
    }

    fn insert(&self, topic: &str, messages: &[Message]) -> Result<Query> {
        match &self.insert {
            Some(f) => f(topic, messages),
            None => self.inner.insert(topic, messages),
        }
    }

    fn select(
        &self,
        topic: &str,
        consumer_group: &str,
        offsets: &dyn OffsetsAdapter,
    ) -> Result<Query> {
        match &self.select {
            Some(f) => f(topic, consumer_group, offsets),
            None => self.inner.select(topic, consumer_group, offsets),
        }
    }

    fn decode(&self, row: &dyn ScanRow) -> Result<MessageRow> {
        match &self.decode {
            Some(f) => f(row),
            None => self.inner.decode(row),
        }
    }

    fn required_isolation(&self) -> IsolationLevel {
        self.inner.required_isolation()
    }
}

impl<S: fmt::Debug> fmt::Debug for SchemaDecorator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDecorator")
            .field("inner", &self.inner)
            .field("init_schema", &self.init_schema.is_some())
            .field("insert", &self.insert.is_some())
            .field("select", &self.select.is_some())
            .field("decode", &self.decode.is_some())
            .finish()
    }
}
