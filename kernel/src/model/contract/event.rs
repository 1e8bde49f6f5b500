use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use shared::error::{AppError, AppResult};

use super::ContractAction;
use crate::model::id::{
    ClientId, PaymentId, ReservationId, ServiceAvailabilityId, ServiceContractId, ServiceId,
};

#[derive(Debug, Clone, new)]
pub struct CreateServiceContract {
    pub service_id: ServiceId,
    pub client_id: ClientId,
    pub quantity: i32,
    pub availability_id: ServiceAvailabilityId,
    pub service_date: NaiveDate,
    pub reservation_id: Option<ReservationId>,
    pub observations: Option<String>,
    pub contracted_at: DateTime<Utc>,
}

impl CreateServiceContract {
    pub fn validate(&self) -> AppResult<()> {
        if self.quantity < 1 {
            return Err(AppError::UnprocessableEntity(format!(
                "quantity must be at least 1: {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, new)]
pub struct TransitionServiceContract {
    pub contract_id: ServiceContractId,
    pub action: ContractAction,
}

#[derive(Debug, Clone, Copy, new)]
pub struct AttachPayment {
    pub contract_id: ServiceContractId,
    pub payment_id: PaymentId,
}

/// Display-only capacity lookup; runs without taking any lock.
#[derive(Debug, Clone, Copy, new)]
pub struct SlotCapacityQuery {
    pub service_id: ServiceId,
    pub availability_id: ServiceAvailabilityId,
    pub on_date: NaiveDate,
}
