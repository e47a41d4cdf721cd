use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    Category, Document, DocumentStatus, Driver, Negotiation, Offer, Order, Party, Passenger,
    Rating, Vehicle,
};
use crate::error::Error;

/// Result of an idempotent registration: the stored profile, and whether it
/// already existed. A returning profile is handed back unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registration<T> {
    pub profile: T,
    pub returning: bool,
}

/// Typed outcome of party classification, replacing free-text role dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Passenger,
    Driver,
    Ambiguous,
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentStanding {
    pub id: Uuid,
    pub category: Category,
    pub status: DocumentStatus,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub driver_id: Uuid,
    pub verified: bool,
    pub documents: Vec<DocumentStanding>,
}

/// A pending order enriched with its passenger's public profile fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailableOrder {
    pub order: Order,
    pub passenger_name: String,
    pub passenger_rating: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfferView {
    pub offer: Offer,
    pub driver_name: String,
    pub driver_rating: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RatingSummary {
    pub rating: Decimal,
    pub count: i64,
    pub comments: Vec<String>,
}

#[async_trait]
pub trait IdentityApi {
    async fn register_passenger(
        &self,
        handle: String,
        name: String,
        phone: String,
    ) -> Result<Registration<Passenger>, Error>;

    async fn register_driver(
        &self,
        handle: String,
        name: String,
        phone: String,
        vehicle: Vehicle,
    ) -> Result<Registration<Driver>, Error>;

    async fn classify_party(&self, handle: String) -> Result<PartyKind, Error>;

    async fn set_driver_availability(&self, handle: String, online: bool) -> Result<Driver, Error>;
}

#[async_trait]
pub trait VerificationApi {
    async fn submit_document(
        &self,
        driver_handle: String,
        category: Category,
        payload: String,
    ) -> Result<Document, Error>;

    async fn adjudicate_document(
        &self,
        document_id: Uuid,
        approve: bool,
        reason: Option<String>,
    ) -> Result<Document, Error>;

    async fn verification_status(&self, driver_handle: String) -> Result<VerificationStatus, Error>;
}

#[async_trait]
pub trait OrderApi {
    async fn create_order(
        &self,
        passenger_handle: String,
        origin: String,
        destination: String,
        suggested_price: i64,
    ) -> Result<Order, Error>;

    async fn list_available_orders(&self) -> Result<Vec<AvailableOrder>, Error>;

    async fn accept_offer(&self, offer_id: Uuid, order_id: Uuid) -> Result<Order, Error>;

    async fn start_ride(&self, order_id: Uuid) -> Result<Order, Error>;

    async fn complete_ride(&self, order_id: Uuid) -> Result<Order, Error>;

    async fn cancel_order(&self, order_id: Uuid) -> Result<Order, Error>;
}

#[async_trait]
pub trait OfferApi {
    async fn make_offer(
        &self,
        driver_handle: String,
        order_id: Uuid,
        price: i64,
        note: Option<String>,
    ) -> Result<Offer, Error>;

    async fn list_offers(&self, order_id: Uuid) -> Result<Vec<OfferView>, Error>;

    async fn make_counter_offer(
        &self,
        order_id: Uuid,
        from_handle: String,
        to_driver_id: Uuid,
        price: i64,
    ) -> Result<Negotiation, Error>;

    async fn respond_to_counter_offer(
        &self,
        driver_handle: String,
        negotiation_id: Uuid,
        accept: bool,
        counter_price: Option<i64>,
    ) -> Result<Negotiation, Error>;
}

#[async_trait]
pub trait RatingApi {
    async fn rate_ride(
        &self,
        from_handle: String,
        order_id: Uuid,
        role: Party,
        score: i64,
        comment: Option<String>,
    ) -> Result<Rating, Error>;

    async fn user_rating(&self, user_id: Uuid, role: Party) -> Result<RatingSummary, Error>;
}

pub trait Api: IdentityApi + VerificationApi + OrderApi + OfferApi + RatingApi {}
