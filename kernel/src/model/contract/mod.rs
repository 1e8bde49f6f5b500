use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{Display, EnumString};

use crate::model::{
    id::{
        ClientId, PaymentId, ReservationId, ServiceAvailabilityId, ServiceContractId, ServiceId,
    },
    lifecycle::Lifecycle,
};

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceContract {
    pub contract_id: ServiceContractId,
    pub service_id: ServiceId,
    pub availability_id: ServiceAvailabilityId,
    pub reservation_id: Option<ReservationId>,
    pub client_id: ClientId,
    pub payment_id: Option<PaymentId>,
    pub contracted_at: DateTime<Utc>,
    /// Date of the slot this contract consumes.
    pub service_date: NaiveDate,
    pub quantity: i32,
    /// Unit price copied from the service when the contract was made.
    pub unit_price: i64,
    pub status: ContractStatus,
    pub observations: Option<String>,
    pub is_active: bool,
}

impl ServiceContract {
    pub fn total(&self) -> AppResult<i64> {
        self.unit_price
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| {
                AppError::UnprocessableEntity(format!(
                    "total of contract ({}) overflows: {} x {}",
                    self.contract_id, self.unit_price, self.quantity
                ))
            })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ContractStatus {
    /// Statuses whose quantity is taken out of a slot's capacity. A completed
    /// contract still holds its slot for the day it was used.
    pub const CONSUMING: [ContractStatus; 3] = [
        ContractStatus::Pending,
        ContractStatus::Confirmed,
        ContractStatus::Completed,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractAction {
    Confirm,
    Complete,
    Cancel,
}

impl Lifecycle for ContractStatus {
    type Action = ContractAction;

    fn next(self, action: ContractAction) -> Option<Self> {
        use ContractAction as A;
        use ContractStatus as S;
        match (self, action) {
            (S::Pending, A::Confirm) => Some(S::Confirmed),
            (S::Confirmed, A::Complete) => Some(S::Completed),
            (S::Pending | S::Confirmed, A::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, ContractStatus::Completed | ContractStatus::Cancelled)
    }
}
