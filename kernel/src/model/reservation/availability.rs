use chrono::{DateTime, Utc};
use shared::error::{AppError, AppResult};

use super::ReservationStatus;
use crate::model::id::{ReservationId, RoomId};

// half-open [start, end): a check-out and a check-in on the same date do not collide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl StayWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::InvalidRange(format!(
                "start ({start}) must be before end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &StayWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An existing claim on a room, as seen by the availability check.
#[derive(Debug, Clone)]
pub struct RoomBooking {
    pub reservation_id: ReservationId,
    pub room_id: RoomId,
    pub status: ReservationStatus,
    pub window: StayWindow,
}

/// Returns the first booking that prevents `window` from being taken,
/// ignoring bookings that belong to `exclude`.
pub fn find_conflict<'a>(
    bookings: &'a [RoomBooking],
    window: &StayWindow,
    exclude: Option<ReservationId>,
) -> Option<&'a RoomBooking> {
    bookings.iter().find(|booking| {
        Some(booking.reservation_id) != exclude
            && booking.status.blocks_room()
            && booking.window.overlaps(window)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, d, 0, 0, 0).unwrap()
    }

    fn booking(status: ReservationStatus, start: u32, end: u32) -> RoomBooking {
        RoomBooking {
            reservation_id: ReservationId::new(),
            room_id: RoomId::new(),
            status,
            window: StayWindow::new(day(start), day(end)).unwrap(),
        }
    }

    #[test]
    fn rejects_empty_and_inverted_windows() {
        assert!(matches!(
            StayWindow::new(day(5), day(5)),
            Err(AppError::InvalidRange(_))
        ));
        assert!(matches!(
            StayWindow::new(day(6), day(5)),
            Err(AppError::InvalidRange(_))
        ));
    }

    #[test]
    fn shared_boundary_is_not_a_conflict() {
        let existing = [booking(ReservationStatus::Confirmed, 1, 5)];
        let overlapping = StayWindow::new(day(3), day(7)).unwrap();
        let turnover = StayWindow::new(day(5), day(8)).unwrap();

        assert!(find_conflict(&existing, &overlapping, None).is_some());
        assert!(find_conflict(&existing, &turnover, None).is_none());
    }

    #[test]
    fn cancelled_and_completed_bookings_do_not_block() {
        let existing = [
            booking(ReservationStatus::Cancelled, 1, 10),
            booking(ReservationStatus::Completed, 1, 10),
        ];
        let window = StayWindow::new(day(2), day(4)).unwrap();
        assert!(find_conflict(&existing, &window, None).is_none());
    }

    #[test]
    fn excluded_reservation_does_not_conflict_with_itself() {
        let existing = [booking(ReservationStatus::Pending, 1, 5)];
        let window = StayWindow::new(day(1), day(5)).unwrap();
        let own = existing[0].reservation_id;

        assert!(find_conflict(&existing, &window, Some(own)).is_none());
        assert!(find_conflict(&existing, &window, Some(ReservationId::new())).is_some());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in 0i64..500, la in 1i64..100, b in 0i64..500, lb in 1i64..100) {
            let base = day(1);
            let x = StayWindow::new(base + Duration::hours(a), base + Duration::hours(a + la)).unwrap();
            let y = StayWindow::new(base + Duration::hours(b), base + Duration::hours(b + lb)).unwrap();
            prop_assert_eq!(x.overlaps(&y), y.overlaps(&x));
        }

        #[test]
        fn adjacent_windows_never_overlap(a in 0i64..500, la in 1i64..100, lb in 1i64..100) {
            let base = day(1);
            let x = StayWindow::new(base + Duration::hours(a), base + Duration::hours(a + la)).unwrap();
            let y = StayWindow::new(x.end(), x.end() + Duration::hours(lb)).unwrap();
            prop_assert!(!x.overlaps(&y));
        }

        #[test]
        fn overlap_matches_shared_instant(a in 0i64..200, la in 1i64..50, b in 0i64..200, lb in 1i64..50) {
            let base = day(1);
            let x = StayWindow::new(base + Duration::hours(a), base + Duration::hours(a + la)).unwrap();
            let y = StayWindow::new(base + Duration::hours(b), base + Duration::hours(b + lb)).unwrap();
            let shares_an_hour = (a..a + la).any(|h| (b..b + lb).contains(&h));
            prop_assert_eq!(x.overlaps(&y), shares_an_hour);
        }
    }
}
