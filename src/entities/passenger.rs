use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::rating::default_rating;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Passenger {
    pub id: Uuid,
    pub handle: String,
    pub name: String,
    pub phone: String,
    pub rating: Decimal,
    pub total_rides: i64,
}

impl Passenger {
    pub fn new(handle: String, name: String, phone: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            name,
            phone,
            rating: default_rating(),
            total_rides: 0,
        }
    }
}
