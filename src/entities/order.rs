use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{conflict, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub passenger_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub suggested_price: i64,
    pub final_price: Option<i64>,
    pub status: Status,
    pub accepted_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Negotiating,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Negotiating => "negotiating",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Order {
    pub fn new(passenger_id: Uuid, origin: String, destination: String, suggested_price: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            passenger_id,
            origin,
            destination,
            suggested_price,
            final_price: None,
            status: Status::Pending,
            accepted_driver_id: None,
            created_at: Utc::now(),
        }
    }

    /// An order remains open to acceptance until a driver wins it.
    pub fn is_open(&self) -> bool {
        matches!(self.status, Status::Pending | Status::Negotiating)
    }

    #[tracing::instrument]
    pub fn accept(&mut self, driver_id: Uuid, final_price: i64) -> Result<(), Error> {
        if !self.is_open() {
            return Err(conflict("order is no longer available"));
        }

        self.status = Status::Accepted;
        self.accepted_driver_id = Some(driver_id);
        self.final_price = Some(final_price);

        Ok(())
    }

    pub fn start(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Accepted => {
                self.status = Status::InProgress;
                Ok(())
            }
            _ => Err(conflict("ride has not been accepted")),
        }
    }

    pub fn complete(&mut self) -> Result<(), Error> {
        match self.status {
            Status::InProgress => {
                self.status = Status::Completed;
                Ok(())
            }
            _ => Err(conflict("ride is not in progress")),
        }
    }

    #[tracing::instrument]
    pub fn cancel(&mut self) -> Result<(), Error> {
        if self.status.is_terminal() {
            return Err(conflict("order is already closed"));
        }

        self.status = Status::Cancelled;
        Ok(())
    }
}
