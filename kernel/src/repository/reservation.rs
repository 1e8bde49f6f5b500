use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    check_in_out::CheckInCheckOut,
    id::{CheckInCheckOutId, ReservationId},
    reservation::{
        event::{
            CancelReservation, CheckIn, CompleteReservation, ConfirmReservation,
            CreateReservation, RoomAvailabilityQuery,
        },
        Reservation, StatusChange,
    },
};

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // Books every requested room or none of them; the reservation starts PENDING
    async fn create(&self, event: CreateReservation) -> AppResult<ReservationId>;
    // PENDING -> CONFIRMED, re-checking each room against other reservations
    async fn confirm(&self, event: ConfirmReservation) -> AppResult<()>;
    // CONFIRMED -> CHECKED_IN, opening one check-in/check-out record per room
    async fn check_in(&self, event: CheckIn) -> AppResult<Vec<CheckInCheckOutId>>;
    // CHECKED_IN -> COMPLETED once every room has checked out
    async fn complete(&self, event: CompleteReservation) -> AppResult<()>;
    // PENDING | CONFIRMED -> CANCELLED, releasing the rooms
    async fn cancel(&self, event: CancelReservation) -> AppResult<()>;
    async fn is_room_available(&self, query: RoomAvailabilityQuery) -> AppResult<bool>;
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>>;
    async fn find_check_in_check_outs(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<CheckInCheckOut>>;
    async fn find_status_history(&self, reservation_id: ReservationId)
        -> AppResult<Vec<StatusChange>>;
}
