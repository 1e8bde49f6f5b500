use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    contract::{
        event::{AttachPayment, CreateServiceContract, SlotCapacityQuery, TransitionServiceContract},
        ServiceContract,
    },
    id::{ReservationId, ServiceContractId},
};

#[async_trait]
pub trait ServiceContractRepository: Send + Sync {
    async fn contract(&self, event: CreateServiceContract) -> AppResult<ServiceContractId>;
    async fn transition(&self, event: TransitionServiceContract) -> AppResult<()>;
    async fn attach_payment(&self, event: AttachPayment) -> AppResult<()>;
    async fn remaining_capacity(&self, query: SlotCapacityQuery) -> AppResult<i32>;
    async fn find_by_id(&self, contract_id: ServiceContractId)
        -> AppResult<Option<ServiceContract>>;
    async fn find_by_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ServiceContract>>;
}
