use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{AvailableOrder, OrderApi};
use crate::entities::Order;
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    passenger_handle: String,
    origin: String,
    destination: String,
    suggested_price: i64,
}

pub async fn create(
    Extension(api): Extension<DynApi>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Order>, Error> {
    let order = api
        .create_order(
            params.passenger_handle,
            params.origin,
            params.destination,
            params.suggested_price,
        )
        .await?;

    Ok(order.into())
}

pub async fn list_available(
    Extension(api): Extension<DynApi>,
) -> Result<Json<Vec<AvailableOrder>>, Error> {
    let orders = api.list_available_orders().await?;

    Ok(orders.into())
}

pub async fn start(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, Error> {
    let order = api.start_ride(id).await?;

    Ok(order.into())
}

pub async fn complete(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, Error> {
    let order = api.complete_ride(id).await?;

    Ok(order.into())
}

pub async fn cancel(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, Error> {
    let order = api.cancel_order(id).await?;

    Ok(order.into())
}
