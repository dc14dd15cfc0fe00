use bytes::Bytes;
use sqlqueue::{
    sqlite::{
        begin, execute, execute_all, fetch_all, fetch_scalar, DefaultSqliteOffsetsAdapter,
        DefaultSqliteSchema,
    },
    Error, IsolationLevel, Message, MessageRow, OffsetsAdapter, SchemaAdapter,
};
use sqlqueue_tests::TestDb;
use sqlx::{Sqlite, Transaction};

const TOPIC: &str = "orders";
const GROUP: &str = "billing";

struct Fixture {
    db: TestDb,
    schema: DefaultSqliteSchema,
    offsets: DefaultSqliteOffsetsAdapter,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_schema(DefaultSqliteSchema::new()).await
    }

    async fn with_schema(schema: DefaultSqliteSchema) -> Self {
        let fixture = Self {
            db: TestDb::new().await,
            schema,
            offsets: DefaultSqliteOffsetsAdapter::new(),
        };
        fixture.init().await;
        fixture
    }

    async fn init(&self) {
        let mut queries = self.schema.init_schema(TOPIC).unwrap();
        queries.extend(self.offsets.init_schema(TOPIC).unwrap());
        let mut tx = self.db.pool.begin().await.unwrap();
        execute_all(&mut tx, &queries).await.unwrap();
        tx.commit().await.unwrap();
    }

    async fn publish(&self, messages: &[Message]) {
        let query = self.schema.insert(TOPIC, messages).unwrap();
        execute(&self.db.pool, &query).await.unwrap();
    }

    async fn publish_numbered(&self, count: usize) {
        let messages: Vec<_> = (1..=count)
            .map(|i| Message::new(format!("msg-{i}"), Bytes::from(i.to_string())))
            .collect();
        self.publish(&messages).await;
    }

    async fn begin(&self) -> Transaction<'static, Sqlite> {
        begin(&self.db.pool, self.schema.required_isolation())
            .await
            .unwrap()
    }

    async fn claim(&self, tx: &mut Transaction<'static, Sqlite>, group: &str) -> i64 {
        let query = self.offsets.claim_bound(TOPIC, group).unwrap();
        fetch_scalar(&mut *tx, &query).await.unwrap()
    }

    async fn fetch(&self, tx: &mut Transaction<'static, Sqlite>, group: &str) -> Vec<MessageRow> {
        let query = self.schema.select(TOPIC, group, &self.offsets).unwrap();
        fetch_all(&mut *tx, &query)
            .await
            .unwrap()
            .iter()
            .map(|row| self.schema.decode(row).unwrap())
            .collect()
    }

    async fn mark_consumed(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        row: &MessageRow,
    ) -> Result<u64, Error> {
        let query = self.offsets.mark_consumed(TOPIC, row, GROUP).unwrap();
        execute(&mut *tx, &query).await
    }

    async fn acknowledge(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        row: &MessageRow,
        group: &str,
    ) {
        let query = self.offsets.acknowledge(TOPIC, row, group).unwrap();
        execute(&mut *tx, &query).await.unwrap();
    }

    /// Claim, fetch and return the bound and batch in a fresh transaction
    /// which is then rolled back.
    async fn peek(&self, group: &str) -> (i64, Vec<i64>) {
        let mut tx = self.begin().await;
        let bound = self.claim(&mut tx, group).await;
        let offsets = self
            .fetch(&mut tx, group)
            .await
            .iter()
            .map(|r| r.offset)
            .collect();
        tx.rollback().await.unwrap();
        (bound, offsets)
    }
}

#[tokio::test]
async fn orders_billing_scenario() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(3).await;

    let mut tx = fixture.begin().await;
    assert_eq!(fixture.claim(&mut tx, GROUP).await, 0);
    let rows = fixture.fetch(&mut tx, GROUP).await;
    assert_eq!(rows.iter().map(|r| r.offset).collect::<Vec<_>>(), vec![1, 2, 3]);
    fixture.acknowledge(&mut tx, &rows[2], GROUP).await;
    tx.commit().await.unwrap();

    assert_eq!(fixture.peek(GROUP).await, (3, vec![]));
}

#[tokio::test]
async fn round_trip() {
    let fixture = Fixture::new().await;
    let sent = Message::new("id-1", &b"hello"[..]).with_metadata("k", "v");
    fixture.publish(&[sent.clone()]).await;

    let mut tx = fixture.begin().await;
    let rows = fixture.fetch(&mut tx, GROUP).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].message, sent);
    assert_eq!(rows[0].message.payload, Bytes::from_static(b"hello"));
    assert_eq!(rows[0].message.metadata["k"], "v");
}

#[tokio::test]
async fn init_schema_is_idempotent() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(2).await;
    let mut tx = fixture.begin().await;
    let rows = fixture.fetch(&mut tx, GROUP).await;
    fixture.acknowledge(&mut tx, &rows[0], GROUP).await;
    tx.commit().await.unwrap();

    fixture.init().await;
    fixture.init().await;

    assert_eq!(fixture.peek(GROUP).await, (1, vec![2]));
}

#[tokio::test]
async fn bound_follows_every_acknowledgment() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(5).await;

    for expected in 1..=5 {
        let mut tx = fixture.begin().await;
        let rows = fixture.fetch(&mut tx, GROUP).await;
        let row = rows.first().unwrap();
        fixture.mark_consumed(&mut tx, row).await.unwrap();
        fixture.acknowledge(&mut tx, row, GROUP).await;
        tx.commit().await.unwrap();

        let mut tx = fixture.begin().await;
        assert_eq!(fixture.claim(&mut tx, GROUP).await, expected);
        tx.rollback().await.unwrap();
    }
}

#[tokio::test]
async fn fetch_is_ordered_bounded_and_limited() {
    let fixture = Fixture::with_schema(DefaultSqliteSchema::new().with_batch_size(4)).await;
    fixture.publish_numbered(10).await;

    let mut tx = fixture.begin().await;
    let first = fixture.fetch(&mut tx, GROUP).await;
    fixture.acknowledge(&mut tx, &first[2], GROUP).await;
    tx.commit().await.unwrap();

    let (bound, batch) = fixture.peek(GROUP).await;
    assert_eq!(bound, 3);
    assert_eq!(batch, vec![4, 5, 6, 7]);
    assert!(batch.windows(2).all(|w| w[0] < w[1]));
    assert!(batch.iter().all(|offset| *offset > bound));
}

#[tokio::test]
async fn crash_before_acknowledge_redelivers() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(2).await;

    let mut tx = fixture.begin().await;
    let rows = fixture.fetch(&mut tx, GROUP).await;
    fixture.acknowledge(&mut tx, &rows[0], GROUP).await;
    tx.commit().await.unwrap();

    let mut tx = fixture.begin().await;
    assert_eq!(fixture.claim(&mut tx, GROUP).await, 1);
    let rows = fixture.fetch(&mut tx, GROUP).await;
    fixture.mark_consumed(&mut tx, &rows[0]).await.unwrap();
    // the subscriber dies here
    drop(tx);

    assert_eq!(fixture.peek(GROUP).await, (1, vec![2]));
}

#[tokio::test]
async fn consumer_groups_are_independent() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(3).await;

    let mut tx = fixture.begin().await;
    let rows = fixture.fetch(&mut tx, GROUP).await;
    fixture.acknowledge(&mut tx, &rows[1], GROUP).await;
    tx.commit().await.unwrap();

    assert_eq!(fixture.peek(GROUP).await, (2, vec![3]));
    assert_eq!(fixture.peek("shipping").await, (0, vec![1, 2, 3]));
}

#[tokio::test]
async fn racing_claims_conflict() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(2).await;

    let mut first = fixture.begin().await;
    let mut second = fixture.begin().await;
    assert_eq!(fixture.claim(&mut first, GROUP).await, 0);
    assert_eq!(fixture.claim(&mut second, GROUP).await, 0);
    let first_rows = fixture.fetch(&mut first, GROUP).await;
    let second_rows = fixture.fetch(&mut second, GROUP).await;

    fixture.mark_consumed(&mut first, &first_rows[0]).await.unwrap();
    let err = fixture
        .mark_consumed(&mut second, &second_rows[0])
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "expected a conflict, got {err:?}");
    second.rollback().await.unwrap();

    fixture.acknowledge(&mut first, &first_rows[0], GROUP).await;
    first.commit().await.unwrap();

    // the loser starts over and sees the winner's progress
    let mut retry = fixture.begin().await;
    assert_eq!(fixture.claim(&mut retry, GROUP).await, 1);
    let rows = fixture.fetch(&mut retry, GROUP).await;
    assert_eq!(rows.iter().map(|r| r.offset).collect::<Vec<_>>(), vec![2]);
    fixture.mark_consumed(&mut retry, &rows[0]).await.unwrap();
    fixture.acknowledge(&mut retry, &rows[0], GROUP).await;
    retry.commit().await.unwrap();

    assert_eq!(fixture.peek(GROUP).await, (2, vec![]));
}

#[tokio::test]
async fn serializable_by_default() {
    assert_eq!(
        DefaultSqliteSchema::new().required_isolation(),
        IsolationLevel::Serializable
    );
}

#[tokio::test]
async fn offsets_keep_growing_across_batches() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(2).await;
    fixture.publish_numbered(2).await;

    let (_, offsets) = fixture.peek(GROUP).await;
    assert_eq!(offsets, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn database_files_are_removed_on_drop() {
    let fixture = Fixture::new().await;
    fixture.publish_numbered(1).await;
    let dir = fixture.db.dir().to_path_buf();
    assert!(dir.join("queue.db").exists());

    fixture.db.pool.close().await;
    drop(fixture);
    assert!(!dir.exists());
}
