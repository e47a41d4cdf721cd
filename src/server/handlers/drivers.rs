use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};

use crate::api::{IdentityApi, Registration};
use crate::entities::{Driver, Vehicle};
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct RegisterParams {
    handle: String,
    name: String,
    phone: String,
    vehicle: Vehicle,
}

#[derive(Serialize, Deserialize)]
pub struct AvailabilityParams {
    online: bool,
}

pub async fn register(
    Extension(api): Extension<DynApi>,
    Json(params): Json<RegisterParams>,
) -> Result<Json<Registration<Driver>>, Error> {
    let registration = api
        .register_driver(params.handle, params.name, params.phone, params.vehicle)
        .await?;

    Ok(registration.into())
}

pub async fn set_availability(
    Extension(api): Extension<DynApi>,
    Path(handle): Path<String>,
    Json(params): Json<AvailabilityParams>,
) -> Result<Json<Driver>, Error> {
    let driver = api.set_driver_availability(handle, params.online).await?;

    Ok(driver.into())
}
