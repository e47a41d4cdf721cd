use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub order_id: Uuid,
    pub driver_id: Uuid,
    pub price: i64,
    pub note: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
    CounterOffered,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::CounterOffered => "counter_offered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "counter_offered" => Some(Self::CounterOffered),
            _ => None,
        }
    }
}

impl Offer {
    pub fn new(order_id: Uuid, driver_id: Uuid, price: i64, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            driver_id,
            price,
            note,
            status: Status::Pending,
            created_at: Utc::now(),
        }
    }
}
