use std::time::Duration;

use demos::{connect, order::Order, TOPIC};
use sqlqueue::{sqlite::DefaultSqliteSchema, Publisher, PublisherConfig};
use tokio::time::sleep;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let pool = connect().await.unwrap();
    let publisher = Publisher::new(pool, DefaultSqliteSchema::new(), PublisherConfig::default());

    let mut published = 0usize;
    loop {
        let orders: Vec<_> = (0..rand::random::<usize>() % 5 + 1)
            .map(|_| Order::new_random())
            .collect();
        let messages = orders
            .iter()
            .map(Order::to_message)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        publisher.publish(TOPIC, &messages).await.unwrap();

        published += messages.len();
        info!("Published {} orders, {} in total", messages.len(), published);

        sleep(Duration::from_millis(500)).await;
    }
}
