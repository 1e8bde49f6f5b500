use kernel::model::{
    contract::ServiceContract,
    id::{
        ClientId, PaymentId, ReservationId, ServiceAvailabilityId, ServiceContractId, ServiceId,
    },
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, NaiveDate, Utc};

use super::parse_column;

#[derive(sqlx::FromRow)]
pub struct ServiceContractRow {
    pub contract_id: ServiceContractId,
    pub service_id: ServiceId,
    pub availability_id: ServiceAvailabilityId,
    pub reservation_id: Option<ReservationId>,
    pub client_id: ClientId,
    pub payment_id: Option<PaymentId>,
    pub contracted_at: DateTime<Utc>,
    pub service_date: NaiveDate,
    pub quantity: i32,
    pub unit_price: i64,
    pub status: String,
    pub observations: Option<String>,
    pub is_active: bool,
}

impl TryFrom<ServiceContractRow> for ServiceContract {
    type Error = AppError;

    fn try_from(value: ServiceContractRow) -> AppResult<Self> {
        let ServiceContractRow {
            contract_id,
            service_id,
            availability_id,
            reservation_id,
            client_id,
            payment_id,
            contracted_at,
            service_date,
            quantity,
            unit_price,
            status,
            observations,
            is_active,
        } = value;
        Ok(ServiceContract {
            contract_id,
            service_id,
            availability_id,
            reservation_id,
            client_id,
            payment_id,
            contracted_at,
            service_date,
            quantity,
            unit_price,
            status: parse_column("contract status", &status)?,
            observations,
            is_active,
        })
    }
}
