use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::rating::default_rating;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub model: String,
    pub color: String,
    pub plate: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub handle: String,
    pub name: String,
    pub phone: String,
    pub rating: Decimal,
    pub total_rides: i64,
    pub online: bool,
    pub verified: bool,
    pub vehicle: Vehicle,
}

impl Driver {
    pub fn new(handle: String, name: String, phone: String, vehicle: Vehicle) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            name,
            phone,
            rating: default_rating(),
            total_rides: 0,
            online: false,
            verified: false,
            vehicle,
        }
    }
}
