use chrono::{NaiveTime, Weekday};
use derive_new::new;
use shared::error::{AppError, AppResult};

use super::ServiceType;
use crate::model::id::ServiceId;

#[derive(Debug, Clone, new)]
pub struct RegisterService {
    pub name: String,
    pub service_type: ServiceType,
    pub unit_price: i64,
}

impl RegisterService {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::UnprocessableEntity("service name is empty".into()));
        }
        match (self.service_type, self.unit_price) {
            (_, p) if p < 0 => Err(AppError::UnprocessableEntity(format!(
                "unit price cannot be negative: {p}"
            ))),
            (ServiceType::Free, p) if p != 0 => Err(AppError::UnprocessableEntity(format!(
                "free service cannot carry a price: {p}"
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, new)]
pub struct RegisterServiceAvailability {
    pub service_id: ServiceId,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub max_capacity: i32,
    pub fixed_time: bool,
}

impl RegisterServiceAvailability {
    pub fn validate(&self) -> AppResult<()> {
        if self.max_capacity < 1 {
            return Err(AppError::UnprocessableEntity(format!(
                "capacity must be at least 1: {}",
                self.max_capacity
            )));
        }
        if let Some(end) = self.end_time {
            if end <= self.start_time {
                return Err(AppError::InvalidRange(format!(
                    "slot end ({end}) must be after start ({})",
                    self.start_time
                )));
            }
        }
        Ok(())
    }
}
