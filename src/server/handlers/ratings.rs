use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{RatingApi, RatingSummary};
use crate::entities::{Party, Rating};
use crate::error::Error;
use crate::server::DynApi;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    from_handle: String,
    order_id: Uuid,
    role: Party,
    score: i64,
    comment: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SummaryParams {
    role: Party,
}

pub async fn create(
    Extension(api): Extension<DynApi>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Rating>, Error> {
    let rating = api
        .rate_ride(
            params.from_handle,
            params.order_id,
            params.role,
            params.score,
            params.comment,
        )
        .await?;

    Ok(rating.into())
}

pub async fn summary(
    Extension(api): Extension<DynApi>,
    Path(id): Path<Uuid>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<RatingSummary>, Error> {
    let summary = api.user_rating(id, params.role).await?;

    Ok(summary.into())
}
