use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    License,
    VehicleRegistration,
    Insurance,
}

impl Category {
    /// Categories a driver must have approved before offering on orders.
    /// Insurance is accepted but does not gate verification.
    pub const REQUIRED: [Category; 2] = [Category::License, Category::VehicleRegistration];

    pub fn name(&self) -> &'static str {
        match self {
            Self::License => "license",
            Self::VehicleRegistration => "vehicle_registration",
            Self::Insurance => "insurance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "license" => Some(Self::License),
            "vehicle_registration" => Some(Self::VehicleRegistration),
            "insurance" => Some(Self::Insurance),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub category: Category,
    pub payload: String,
    pub status: Status,
    pub reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Document {
    pub fn new(driver_id: Uuid, category: Category, payload: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            driver_id,
            category,
            payload,
            status: Status::Pending,
            reason: None,
            submitted_at: Utc::now(),
        }
    }
}

/// True iff every required category has an approved document in the set.
pub fn meets_requirements(documents: &[Document]) -> bool {
    Category::REQUIRED.iter().all(|required| {
        documents
            .iter()
            .any(|document| document.category == *required && document.status == Status::Approved)
    })
}
