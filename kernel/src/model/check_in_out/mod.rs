use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{Display, EnumString};

use crate::model::id::{CheckInCheckOutId, ReservationDetailId};

pub mod event;

/// Occupancy record of one reservation detail, opened at check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInCheckOut {
    pub check_in_check_out_id: CheckInCheckOutId,
    pub detail_id: ReservationDetailId,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub status: CheckInCheckOutStatus,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInCheckOutStatus {
    Pending,
    Done,
}

impl CheckInCheckOut {
    pub fn is_done(&self) -> bool {
        self.status == CheckInCheckOutStatus::Done
    }

    pub fn ensure_can_check_out(&self, at: DateTime<Utc>) -> AppResult<()> {
        if self.is_done() {
            return Err(AppError::AlreadyCheckedOut(format!(
                "check-in/check-out ({}) was closed at {:?}",
                self.check_in_check_out_id, self.checked_out_at
            )));
        }
        if at < self.checked_in_at {
            return Err(AppError::InvalidRange(format!(
                "check-out ({at}) precedes check-in ({})",
                self.checked_in_at
            )));
        }
        Ok(())
    }
}
