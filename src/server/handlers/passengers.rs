use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};

use crate::api::{IdentityApi, PartyKind, Registration};
use crate::entities::Passenger;
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct RegisterParams {
    handle: String,
    name: String,
    phone: String,
}

pub async fn register(
    Extension(api): Extension<DynApi>,
    Json(params): Json<RegisterParams>,
) -> Result<Json<Registration<Passenger>>, Error> {
    let registration = api
        .register_passenger(params.handle, params.name, params.phone)
        .await?;

    Ok(registration.into())
}

pub async fn classify(
    Extension(api): Extension<DynApi>,
    Path(handle): Path<String>,
) -> Result<Json<PartyKind>, Error> {
    let kind = api.classify_party(handle).await?;

    Ok(kind.into())
}
