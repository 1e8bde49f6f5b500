use kernel::model::{
    id::{ClientId, ReservationDetailId, ReservationId, RoomId},
    reservation::{
        availability::{RoomBooking, StayWindow},
        Reservation, ReservationDetail, ReservationStatus, StatusChange,
    },
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, Utc};

use super::parse_column;

#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
    pub is_active: bool,
}

impl ReservationRow {
    pub fn status(&self) -> AppResult<ReservationStatus> {
        parse_column("reservation status", &self.status)
    }

    pub fn into_reservation(self, details: Vec<ReservationDetail>) -> AppResult<Reservation> {
        let status = self.status()?;
        let ReservationRow {
            reservation_id,
            client_id,
            created_at,
            start_at,
            end_at,
            status: _,
            is_active,
        } = self;
        Ok(Reservation {
            reservation_id,
            client_id,
            created_at,
            start_at,
            end_at,
            status,
            is_active,
            details,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct ReservationDetailRow {
    pub detail_id: ReservationDetailId,
    pub reservation_id: ReservationId,
    pub room_id: RoomId,
    pub note: String,
    pub is_active: bool,
}

impl From<ReservationDetailRow> for ReservationDetail {
    fn from(value: ReservationDetailRow) -> Self {
        let ReservationDetailRow {
            detail_id,
            reservation_id,
            room_id,
            note,
            is_active,
        } = value;
        ReservationDetail {
            detail_id,
            reservation_id,
            room_id,
            note,
            is_active,
        }
    }
}

// Existing claim on a room, read while checking availability
#[derive(sqlx::FromRow)]
pub struct RoomBookingRow {
    pub reservation_id: ReservationId,
    pub room_id: RoomId,
    pub status: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl TryFrom<RoomBookingRow> for RoomBooking {
    type Error = AppError;

    fn try_from(value: RoomBookingRow) -> AppResult<Self> {
        let RoomBookingRow {
            reservation_id,
            room_id,
            status,
            start_at,
            end_at,
        } = value;
        Ok(RoomBooking {
            reservation_id,
            room_id,
            status: parse_column("reservation status", &status)?,
            window: StayWindow::new(start_at, end_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct StatusChangeRow {
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_at: DateTime<Utc>,
}

impl TryFrom<StatusChangeRow> for StatusChange {
    type Error = AppError;

    fn try_from(value: StatusChangeRow) -> AppResult<Self> {
        let StatusChangeRow {
            from_status,
            to_status,
            changed_at,
        } = value;
        Ok(StatusChange {
            from: from_status
                .map(|s| parse_column("reservation status", &s))
                .transpose()?,
            to: parse_column("reservation status", &to_status)?,
            changed_at,
        })
    }
}
