use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{OfferApi, OfferView, OrderApi};
use crate::entities::{Offer, Order};
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    driver_handle: String,
    order_id: Uuid,
    price: i64,
    note: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AcceptParams {
    order_id: Uuid,
}

pub async fn create(
    Extension(api): Extension<DynApi>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Offer>, Error> {
    let offer = api
        .make_offer(params.driver_handle, params.order_id, params.price, params.note)
        .await?;

    Ok(offer.into())
}

pub async fn list(
    Extension(api): Extension<DynApi>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<OfferView>>, Error> {
    let offers = api.list_offers(order_id).await?;

    Ok(offers.into())
}

pub async fn accept(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
    Json(params): Json<AcceptParams>,
) -> Result<Json<Order>, Error> {
    let order = api.accept_offer(id, params.order_id).await?;

    Ok(order.into())
}
