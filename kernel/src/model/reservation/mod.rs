use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::{
    id::{ClientId, ReservationDetailId, ReservationId, RoomId},
    lifecycle::Lifecycle,
};

pub mod availability;
pub mod event;

#[derive(Debug, Clone)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub client_id: ClientId,
    pub created_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub is_active: bool,
    pub details: Vec<ReservationDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDetail {
    pub detail_id: ReservationDetailId,
    pub reservation_id: ReservationId,
    pub room_id: RoomId,
    pub note: String,
    pub is_active: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Statuses whose reservations hold their rooms.
    pub const BLOCKING: [ReservationStatus; 3] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::CheckedIn,
    ];

    pub fn blocks_room(self) -> bool {
        Self::BLOCKING.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReservationAction {
    Confirm,
    CheckIn,
    Complete,
    Cancel,
}

impl Lifecycle for ReservationStatus {
    type Action = ReservationAction;

    fn next(self, action: ReservationAction) -> Option<Self> {
        use ReservationAction as A;
        use ReservationStatus as S;
        match (self, action) {
            (S::Pending, A::Confirm) => Some(S::Confirmed),
            (S::Confirmed, A::CheckIn) => Some(S::CheckedIn),
            (S::CheckedIn, A::Complete) => Some(S::Completed),
            (S::Pending | S::Confirmed, A::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Cancelled)
    }
}

/// One row of a reservation's status history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub from: Option<ReservationStatus>,
    pub to: ReservationStatus,
    pub changed_at: DateTime<Utc>,
}

/// Checks that a recorded history is a walk through the transition table,
/// starting from the initial `PENDING` row.
pub fn is_legal_history(history: &[StatusChange]) -> bool {
    let mut iter = history.iter();
    match iter.next() {
        Some(StatusChange {
            from: None,
            to: ReservationStatus::Pending,
            ..
        }) => {}
        _ => return false,
    }
    let mut current = ReservationStatus::Pending;
    for change in iter {
        if change.from != Some(current) {
            return false;
        }
        let reachable = [
            ReservationAction::Confirm,
            ReservationAction::CheckIn,
            ReservationAction::Complete,
            ReservationAction::Cancel,
        ]
        .into_iter()
        .any(|action| current.next(action) == Some(change.to));
        if !reachable {
            return false;
        }
        current = change.to;
    }
    true
}
