use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kernel::model::{check_in_out::event::CheckOut, id::CheckInCheckOutId};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::model::check_in_out::CheckOutRequest;

pub async fn check_out(
    Path(id): Path<CheckInCheckOutId>,
    State(registry): State<AppRegistry>,
    req: Option<Json<CheckOutRequest>>,
) -> AppResult<StatusCode> {
    let checked_out_at = req
        .and_then(|Json(body)| body.checked_out_at)
        .unwrap_or_else(Utc::now);

    registry
        .check_in_out_repository()
        .check_out(CheckOut::new(id, checked_out_at))
        .await
        .map(|_| StatusCode::OK)
}
