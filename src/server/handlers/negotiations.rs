use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::OfferApi;
use crate::entities::Negotiation;
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    from_handle: String,
    to_driver_id: Uuid,
    price: i64,
}

#[derive(Serialize, Deserialize)]
pub struct RespondParams {
    driver_handle: String,
    accept: bool,
    counter_price: Option<i64>,
}

pub async fn create(
    Extension(api): Extension<DynApi>,
    Path(order_id): Path<Uuid>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Negotiation>, Error> {
    let negotiation = api
        .make_counter_offer(order_id, params.from_handle, params.to_driver_id, params.price)
        .await?;

    Ok(negotiation.into())
}

pub async fn respond(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
    Json(params): Json<RespondParams>,
) -> Result<Json<Negotiation>, Error> {
    let negotiation = api
        .respond_to_counter_offer(params.driver_handle, id, params.accept, params.counter_price)
        .await?;

    Ok(negotiation.into())
}
