use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Party;
use crate::error::{conflict, Error};

/// A directed price proposal within an order's negotiation thread.
/// Counter-proposals are new records; resolved records never change again.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Negotiation {
    pub id: Uuid,
    pub order_id: Uuid,
    pub from_user_id: Uuid,
    pub from_party: Party,
    pub to_user_id: Uuid,
    pub price: i64,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    Rejected,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl Negotiation {
    pub fn new(
        order_id: Uuid,
        from_user_id: Uuid,
        from_party: Party,
        to_user_id: Uuid,
        price: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            from_user_id,
            from_party,
            to_user_id,
            price,
            status: Status::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn resolve(&mut self, outcome: Status) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = outcome;
                Ok(())
            }
            _ => Err(conflict("negotiation is already resolved")),
        }
    }
}
