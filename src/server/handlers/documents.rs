use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{VerificationApi, VerificationStatus};
use crate::entities::{Category, Document};
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct SubmitParams {
    category: Category,
    payload: String,
}

#[derive(Serialize, Deserialize)]
pub struct AdjudicateParams {
    approve: bool,
    reason: Option<String>,
}

pub async fn submit(
    Extension(api): Extension<DynApi>,
    Path(handle): Path<String>,
    Json(params): Json<SubmitParams>,
) -> Result<Json<Document>, Error> {
    let document = api
        .submit_document(handle, params.category, params.payload)
        .await?;

    Ok(document.into())
}

pub async fn status(
    Extension(api): Extension<DynApi>,
    Path(handle): Path<String>,
) -> Result<Json<VerificationStatus>, Error> {
    let status = api.verification_status(handle).await?;

    Ok(status.into())
}

pub async fn adjudicate(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
    Json(params): Json<AdjudicateParams>,
) -> Result<Json<Document>, Error> {
    let document = api
        .adjudicate_document(id, params.approve, params.reason)
        .await?;

    Ok(document.into())
}
