use std::time::Duration;

use async_trait::async_trait;
use demos::{connect, order::Order, TOPIC};
use sqlqueue::{
    sqlite::{DefaultSqliteOffsetsAdapter, DefaultSqliteSchema},
    Handler, MessageRow, Subscriber, SubscriberConfig,
};
use tokio::sync::{mpsc::unbounded_channel, oneshot};
use tracing::{info, warn};

struct Billing;

#[async_trait]
impl Handler for Billing {
    type Error = serde_json::Error;

    async fn handle(&self, row: &MessageRow) -> Result<(), Self::Error> {
        let order = Order::from_payload(&row.message.payload)?;
        info!("Billing offset {} created at {}: {}", row.offset, row.created_at, order);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let group = std::env::var("CONSUMER_GROUP").unwrap_or_else(|_| "billing".to_string());
    let pool = connect().await.unwrap();
    let subscriber = Subscriber::new(
        pool,
        DefaultSqliteSchema::new(),
        DefaultSqliteOffsetsAdapter::new(),
        SubscriberConfig::new(group).with_poll_interval(Duration::from_millis(250)),
    );

    let (errors, mut errors_rx) = unbounded_channel();
    tokio::spawn(async move {
        while let Some(e) = errors_rx.recv().await {
            warn!("Subscriber error: {:?}", e);
        }
    });

    // never signalled, runs until killed
    let (_stop, stop_rx) = oneshot::channel();
    subscriber
        .run(TOPIC, &Billing, stop_rx, Some(errors))
        .await
        .unwrap();
}
