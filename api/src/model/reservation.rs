use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    check_in_out::{CheckInCheckOut, CheckInCheckOutStatus},
    id::{CheckInCheckOutId, ClientId, ReservationDetailId, ReservationId, RoomId},
    reservation::{
        event::{CreateReservation, RequestedRoom},
        Reservation, ReservationDetail, ReservationStatus,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(skip)]
    pub client_id: ClientId,
    #[garde(skip)]
    pub start_at: DateTime<Utc>,
    #[garde(skip)]
    pub end_at: DateTime<Utc>,
    #[garde(length(min = 1), dive)]
    pub rooms: Vec<RequestedRoomRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestedRoomRequest {
    #[garde(skip)]
    pub room_id: RoomId,
    #[serde(default)]
    #[garde(length(max = 500))]
    pub note: String,
}

#[derive(new)]
pub struct CreateReservationRequestAt {
    pub requested_at: DateTime<Utc>,
    pub body: CreateReservationRequest,
}

impl From<CreateReservationRequestAt> for CreateReservation {
    fn from(value: CreateReservationRequestAt) -> Self {
        let CreateReservationRequestAt {
            requested_at,
            body:
                CreateReservationRequest {
                    client_id,
                    start_at,
                    end_at,
                    rooms,
                },
        } = value;
        let rooms = rooms
            .into_iter()
            .map(|r| RequestedRoom::new(r.room_id, r.note))
            .collect();
        CreateReservation::new(client_id, start_at, end_at, rooms, requested_at)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreatedResponse {
    pub reservation_id: ReservationId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub details: Vec<ReservationDetailResponse>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            reservation_id,
            client_id,
            created_at,
            start_at,
            end_at,
            status,
            details,
            ..
        } = value;
        Self {
            reservation_id,
            client_id,
            created_at,
            start_at,
            end_at,
            status,
            details: details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetailResponse {
    pub detail_id: ReservationDetailId,
    pub room_id: RoomId,
    pub note: String,
    pub is_active: bool,
}

impl From<ReservationDetail> for ReservationDetailResponse {
    fn from(value: ReservationDetail) -> Self {
        let ReservationDetail {
            detail_id,
            room_id,
            note,
            is_active,
            ..
        } = value;
        Self {
            detail_id,
            room_id,
            note,
            is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub check_in_check_out_ids: Vec<CheckInCheckOutId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInCheckOutResponse {
    pub check_in_check_out_id: CheckInCheckOutId,
    pub detail_id: ReservationDetailId,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub status: CheckInCheckOutStatus,
}

impl From<CheckInCheckOut> for CheckInCheckOutResponse {
    fn from(value: CheckInCheckOut) -> Self {
        let CheckInCheckOut {
            check_in_check_out_id,
            detail_id,
            checked_in_at,
            checked_out_at,
            status,
        } = value;
        Self {
            check_in_check_out_id,
            detail_id,
            checked_in_at,
            checked_out_at,
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub room_id: RoomId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}
