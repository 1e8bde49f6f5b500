use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    lock::LockTable,
    repository::{
        catalog::CatalogRepositoryImpl, check_in_out::CheckInCheckOutRepositoryImpl,
        contract::ServiceContractRepositoryImpl, health::HealthCheckRepositoryImpl,
        payment::PaymentRepositoryImpl, reservation::ReservationRepositoryImpl,
    },
};
use kernel::repository::{
    catalog::CatalogRepository, check_in_out::CheckInCheckOutRepository,
    contract::ServiceContractRepository, health::HealthCheckRepository,
    payment::PaymentRepository, reservation::ReservationRepository,
};
use shared::config::LockConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    catalog_repository: Arc<dyn CatalogRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    check_in_out_repository: Arc<dyn CheckInCheckOutRepository>,
    service_contract_repository: Arc<dyn ServiceContractRepository>,
    payment_repository: Arc<dyn PaymentRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, lock_config: LockConfig) -> Self {
        // one lock table per resource kind, shared by every writer of it
        let room_locks = Arc::new(LockTable::new(lock_config));
        let slot_locks = Arc::new(LockTable::new(lock_config));

        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let catalog_repository = Arc::new(CatalogRepositoryImpl::new(pool.clone()));
        let reservation_repository =
            Arc::new(ReservationRepositoryImpl::new(pool.clone(), room_locks));
        let check_in_out_repository = Arc::new(CheckInCheckOutRepositoryImpl::new(pool.clone()));
        let service_contract_repository =
            Arc::new(ServiceContractRepositoryImpl::new(pool.clone(), slot_locks));
        let payment_repository = Arc::new(PaymentRepositoryImpl::new(pool.clone()));
        Self {
            health_check_repository,
            catalog_repository,
            reservation_repository,
            check_in_out_repository,
            service_contract_repository,
            payment_repository,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn catalog_repository(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn check_in_out_repository(&self) -> Arc<dyn CheckInCheckOutRepository> {
        self.check_in_out_repository.clone()
    }

    pub fn service_contract_repository(&self) -> Arc<dyn ServiceContractRepository> {
        self.service_contract_repository.clone()
    }

    pub fn payment_repository(&self) -> Arc<dyn PaymentRepository> {
        self.payment_repository.clone()
    }
}
