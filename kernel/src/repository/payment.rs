use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{PaymentId, ReservationId},
    payment::{
        event::{RecordPayment, TransitionPayment},
        Payment,
    },
};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn record(&self, event: RecordPayment) -> AppResult<PaymentId>;
    async fn transition(&self, event: TransitionPayment) -> AppResult<()>;
    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>>;
    async fn find_by_reservation(&self, reservation_id: ReservationId) -> AppResult<Vec<Payment>>;
}
