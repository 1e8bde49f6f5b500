use chrono::{DateTime, Utc};
use derive_new::new;
use shared::error::{AppError, AppResult};

use super::{PaymentAction, PaymentMethod};
use crate::model::id::{PaymentId, ReservationId};

#[derive(Debug, Clone, Copy, new)]
pub struct RecordPayment {
    pub reservation_id: ReservationId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub paid_at: DateTime<Utc>,
}

impl RecordPayment {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount <= 0 {
            return Err(AppError::UnprocessableEntity(format!(
                "payment amount must be positive: {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, new)]
pub struct TransitionPayment {
    pub payment_id: PaymentId,
    pub action: PaymentAction,
}
