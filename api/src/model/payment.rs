use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{PaymentId, ReservationId},
    payment::{event::RecordPayment, Payment, PaymentMethod, PaymentStatus},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    #[garde(skip)]
    pub reservation_id: ReservationId,
    #[garde(range(min = 1))]
    pub amount: i64,
    #[garde(skip)]
    pub method: PaymentMethod,
}

#[derive(new)]
pub struct RecordPaymentRequestAt {
    pub paid_at: DateTime<Utc>,
    pub body: RecordPaymentRequest,
}

impl From<RecordPaymentRequestAt> for RecordPayment {
    fn from(value: RecordPaymentRequestAt) -> Self {
        let RecordPaymentRequestAt {
            paid_at,
            body:
                RecordPaymentRequest {
                    reservation_id,
                    amount,
                    method,
                },
        } = value;
        RecordPayment::new(reservation_id, amount, method, paid_at)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreatedResponse {
    pub payment_id: PaymentId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    pub reservation_id: ReservationId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        let Payment {
            payment_id,
            reservation_id,
            amount,
            method,
            status,
            paid_at,
        } = value;
        Self {
            payment_id,
            reservation_id,
            amount,
            method,
            status,
            paid_at,
        }
    }
}
