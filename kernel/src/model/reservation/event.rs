use std::collections::HashSet;

use chrono::{DateTime, Utc};
use derive_new::new;
use shared::error::{AppError, AppResult};

use super::availability::StayWindow;
use crate::model::id::{ClientId, ReservationId, RoomId};

#[derive(Debug, Clone, new)]
pub struct RequestedRoom {
    pub room_id: RoomId,
    pub note: String,
}

#[derive(Debug, Clone, new)]
pub struct CreateReservation {
    pub client_id: ClientId,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub rooms: Vec<RequestedRoom>,
    pub requested_at: DateTime<Utc>,
}

impl CreateReservation {
    /// Checks the request shape and returns the stay window it asks for.
    pub fn validate(&self) -> AppResult<StayWindow> {
        let window = StayWindow::new(self.start_at, self.end_at)?;
        if self.rooms.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "a reservation needs at least one room".into(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.rooms.iter().find(|r| !seen.insert(r.room_id)) {
            return Err(AppError::UnprocessableEntity(format!(
                "room ({}) is requested more than once",
                dup.room_id
            )));
        }
        Ok(window)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|r| r.room_id).collect()
    }
}

#[derive(Debug, Clone, Copy, new)]
pub struct ConfirmReservation {
    pub reservation_id: ReservationId,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, new)]
pub struct CheckIn {
    pub reservation_id: ReservationId,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, new)]
pub struct CompleteReservation {
    pub reservation_id: ReservationId,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, new)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
    pub cancelled_at: DateTime<Utc>,
}

/// Display-only availability lookup; runs without taking any lock.
#[derive(Debug, Clone, Copy, new)]
pub struct RoomAvailabilityQuery {
    pub room_id: RoomId,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub exclude_reservation_id: Option<ReservationId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(rooms: Vec<RequestedRoom>) -> CreateReservation {
        let now = Utc::now();
        CreateReservation::new(ClientId::new(), now, now + Duration::days(2), rooms, now)
    }

    #[test]
    fn needs_at_least_one_room() {
        assert!(matches!(
            request(vec![]).validate(),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn same_room_twice_is_rejected() {
        let room_id = RoomId::new();
        let req = request(vec![
            RequestedRoom::new(room_id, "".into()),
            RequestedRoom::new(room_id, "extra bed".into()),
        ]);
        assert!(matches!(req.validate(), Err(AppError::UnprocessableEntity(_))));
    }

    #[test]
    fn inverted_interval_is_an_invalid_range() {
        let mut req = request(vec![RequestedRoom::new(RoomId::new(), "".into())]);
        std::mem::swap(&mut req.start_at, &mut req.end_at);
        assert!(matches!(req.validate(), Err(AppError::InvalidRange(_))));
    }
}
