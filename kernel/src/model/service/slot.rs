use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use shared::error::{AppError, AppResult};

use crate::model::id::{ServiceAvailabilityId, ServiceId};

/// A weekly template such as "spa, Mondays 09:00, four guests".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAvailability {
    pub availability_id: ServiceAvailabilityId,
    pub service_id: ServiceId,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub max_capacity: i32,
    pub fixed_time: bool,
    pub is_active: bool,
}

impl ServiceAvailability {
    /// Rejects a (service, date) pair this template cannot be booked for.
    pub fn ensure_serves(&self, service_id: ServiceId, on_date: NaiveDate) -> AppResult<()> {
        if self.service_id != service_id {
            return Err(AppError::SlotMismatch(format!(
                "availability ({}) belongs to service ({}), not ({service_id})",
                self.availability_id, self.service_id
            )));
        }
        if on_date.weekday() != self.day_of_week {
            return Err(AppError::SlotMismatch(format!(
                "{on_date} is a {}, availability ({}) runs on {}",
                on_date.weekday(),
                self.availability_id,
                self.day_of_week
            )));
        }
        Ok(())
    }

    /// Capacity left once `booked` units are taken, never below zero.
    pub fn remaining_capacity(&self, booked: i64) -> i32 {
        let left = (i64::from(self.max_capacity) - booked).max(0);
        i32::try_from(left).unwrap_or(i32::MAX)
    }
}

/// Stored day index, `0` = Monday through `6` = Sunday.
pub fn weekday_index(day: Weekday) -> i16 {
    day.num_days_from_monday() as i16
}

pub fn weekday_from_index(index: i16) -> AppResult<Weekday> {
    u8::try_from(index)
        .ok()
        .and_then(|i| Weekday::try_from(i).ok())
        .ok_or_else(|| AppError::ConversionEntityError(format!("invalid day of week: {index}")))
}
