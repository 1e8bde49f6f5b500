use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    client::{Client, RegisterClient},
    id::{ClientId, RoomId, ServiceAvailabilityId, ServiceId},
    room::{RegisterRoom, Room},
    service::{
        event::{RegisterService, RegisterServiceAvailability},
        slot::ServiceAvailability,
        Service,
    },
};

/// Reference data owned outside the booking engine. Lookups return `None`
/// for unknown ids; the engine decides whether that is an error.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn register_room(&self, event: RegisterRoom) -> AppResult<RoomId>;
    async fn register_client(&self, event: RegisterClient) -> AppResult<ClientId>;
    async fn register_service(&self, event: RegisterService) -> AppResult<ServiceId>;
    async fn register_service_availability(
        &self,
        event: RegisterServiceAvailability,
    ) -> AppResult<ServiceAvailabilityId>;
    async fn find_room(&self, room_id: RoomId) -> AppResult<Option<Room>>;
    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>>;
    async fn find_service(&self, service_id: ServiceId) -> AppResult<Option<Service>>;
    async fn find_service_availability(
        &self,
        availability_id: ServiceAvailabilityId,
    ) -> AppResult<Option<ServiceAvailability>>;
}
