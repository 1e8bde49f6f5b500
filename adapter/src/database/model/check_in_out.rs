use kernel::model::{
    check_in_out::CheckInCheckOut,
    id::{CheckInCheckOutId, ReservationDetailId},
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, Utc};

use super::parse_column;

#[derive(sqlx::FromRow)]
pub struct CheckInCheckOutRow {
    pub check_in_check_out_id: CheckInCheckOutId,
    pub detail_id: ReservationDetailId,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl TryFrom<CheckInCheckOutRow> for CheckInCheckOut {
    type Error = AppError;

    fn try_from(value: CheckInCheckOutRow) -> AppResult<Self> {
        let CheckInCheckOutRow {
            check_in_check_out_id,
            detail_id,
            checked_in_at,
            checked_out_at,
            status,
        } = value;
        Ok(CheckInCheckOut {
            check_in_check_out_id,
            detail_id,
            checked_in_at,
            checked_out_at,
            status: parse_column("check-in/check-out status", &status)?,
        })
    }
}
