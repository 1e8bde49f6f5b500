use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    contract::{event::CreateServiceContract, ContractStatus, ServiceContract},
    id::{
        ClientId, PaymentId, ReservationId, ServiceAvailabilityId, ServiceContractId, ServiceId,
    },
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceContractRequest {
    #[garde(skip)]
    pub service_id: ServiceId,
    #[garde(skip)]
    pub client_id: ClientId,
    #[garde(range(min = 1))]
    pub quantity: i32,
    #[garde(skip)]
    pub availability_id: ServiceAvailabilityId,
    #[garde(skip)]
    pub service_date: NaiveDate,
    #[garde(skip)]
    pub reservation_id: Option<ReservationId>,
    #[garde(length(max = 1000))]
    pub observations: Option<String>,
}

#[derive(new)]
pub struct CreateServiceContractRequestAt {
    pub contracted_at: DateTime<Utc>,
    pub body: CreateServiceContractRequest,
}

impl From<CreateServiceContractRequestAt> for CreateServiceContract {
    fn from(value: CreateServiceContractRequestAt) -> Self {
        let CreateServiceContractRequestAt {
            contracted_at,
            body:
                CreateServiceContractRequest {
                    service_id,
                    client_id,
                    quantity,
                    availability_id,
                    service_date,
                    reservation_id,
                    observations,
                },
        } = value;
        CreateServiceContract::new(
            service_id,
            client_id,
            quantity,
            availability_id,
            service_date,
            reservation_id,
            observations,
            contracted_at,
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContractCreatedResponse {
    pub contract_id: ServiceContractId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContractResponse {
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
    pub total: i64,
    pub status: ContractStatus,
    pub observations: Option<String>,
}

impl TryFrom<ServiceContract> for ServiceContractResponse {
    type Error = AppError;

    fn try_from(value: ServiceContract) -> Result<Self, Self::Error> {
        let total = value.total()?;
        let ServiceContract {
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
            ..
        } = value;
        Ok(Self {
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
            total,
            status,
            observations,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachPaymentRequest {
    pub payment_id: PaymentId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityQuery {
    pub availability_id: ServiceAvailabilityId,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityResponse {
    pub service_id: ServiceId,
    pub availability_id: ServiceAvailabilityId,
    pub date: NaiveDate,
    pub remaining: i32,
}
