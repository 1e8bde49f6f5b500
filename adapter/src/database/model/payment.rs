use kernel::model::{
    id::{PaymentId, ReservationId},
    payment::Payment,
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, Utc};

use super::parse_column;

#[derive(sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: PaymentId,
    pub reservation_id: ReservationId,
    pub amount: i64,
    pub method: String,
    pub status: String,
    pub paid_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(value: PaymentRow) -> AppResult<Self> {
        let PaymentRow {
            payment_id,
            reservation_id,
            amount,
            method,
            status,
            paid_at,
        } = value;
        Ok(Payment {
            payment_id,
            reservation_id,
            amount,
            method: parse_column("payment method", &method)?,
            status: parse_column("payment status", &status)?,
            paid_at,
        })
    }
}
