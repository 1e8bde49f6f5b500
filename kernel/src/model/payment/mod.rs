use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::{
    id::{PaymentId, ReservationId},
    lifecycle::Lifecycle,
};

pub mod event;

/// Ledger entry for money received against a reservation. Recording a
/// payment never moves money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub reservation_id: ReservationId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PaymentAction {
    Complete,
    Fail,
    Refund,
}

impl Lifecycle for PaymentStatus {
    type Action = PaymentAction;

    fn next(self, action: PaymentAction) -> Option<Self> {
        match (self, action) {
            (PaymentStatus::Pending, PaymentAction::Complete) => Some(PaymentStatus::Completed),
            (PaymentStatus::Pending, PaymentAction::Fail) => Some(PaymentStatus::Failed),
            (PaymentStatus::Completed, PaymentAction::Refund) => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }
}
