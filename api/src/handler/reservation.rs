use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    id::{ReservationId, RoomId},
    reservation::event::{
        CancelReservation, CheckIn, CompleteReservation, ConfirmReservation,
        RoomAvailabilityQuery,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::reservation::{
    AvailabilityQuery, AvailabilityResponse, CheckInCheckOutResponse, CheckInResponse,
    CreateReservationRequest, CreateReservationRequestAt, ReservationCreatedResponse,
    ReservationResponse,
};

pub async fn create_reservation(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationCreatedResponse>)> {
    req.validate(&())?;

    let event = CreateReservationRequestAt::new(Utc::now(), req);
    registry
        .reservation_repository()
        .create(event.into())
        .await
        .map(|reservation_id| {
            (
                StatusCode::CREATED,
                Json(ReservationCreatedResponse { reservation_id }),
            )
        })
}

pub async fn show_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await
        .and_then(|r| match r {
            Some(r) => Ok(Json(r.into())),
            None => Err(AppError::EntityNotFound(format!(
                "reservation ({reservation_id}) was not found"
            ))),
        })
}

pub async fn confirm_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .confirm(ConfirmReservation::new(reservation_id, Utc::now()))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn check_in(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckInResponse>> {
    registry
        .reservation_repository()
        .check_in(CheckIn::new(reservation_id, Utc::now()))
        .await
        .map(|check_in_check_out_ids| {
            Json(CheckInResponse {
                check_in_check_out_ids,
            })
        })
}

pub async fn complete_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .complete(CompleteReservation::new(reservation_id, Utc::now()))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn cancel_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .cancel(CancelReservation::new(reservation_id, Utc::now()))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn show_check_in_check_outs(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<CheckInCheckOutResponse>>> {
    registry
        .reservation_repository()
        .find_check_in_check_outs(reservation_id)
        .await
        .map(|records| Json(records.into_iter().map(Into::into).collect()))
}

pub async fn check_room_availability(
    Path(room_id): Path<RoomId>,
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AvailabilityResponse>> {
    let AvailabilityQuery { start, end } = query;
    registry
        .reservation_repository()
        .is_room_available(RoomAvailabilityQuery::new(room_id, start, end, None))
        .await
        .map(|available| {
            Json(AvailabilityResponse {
                room_id,
                start,
                end,
                available,
            })
        })
}
