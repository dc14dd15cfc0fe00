use std::fmt::{self, Display};

use bytes::Bytes;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlqueue::Message;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub customer: u32,
    pub sku: String,
    pub quantity: u32,
    pub cents: u64,
}

impl Order {
    pub fn new_random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            customer: rng.gen_range(1..100),
            sku: format!("SKU-{:04}", rng.gen_range(0..10_000)),
            quantity: rng.gen_range(1..5),
            cents: rng.gen_range(100..100_000),
        }
    }

    pub fn to_message(&self) -> serde_json::Result<Message> {
        let payload = Bytes::from(serde_json::to_vec(self)?);
        Ok(Message::with_random_uuid(payload).with_metadata("customer", self.customer.to_string()))
    }

    pub fn from_payload(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    pub fn total_cents(&self) -> u64 {
        self.cents * u64::from(self.quantity)
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} for customer {} ({}.{:02})",
            self.quantity,
            self.sku,
            self.customer,
            self.total_cents() / 100,
            self.total_cents() % 100
        )
    }
}
