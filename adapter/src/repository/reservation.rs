use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use kernel::{
    model::{
        check_in_out::{CheckInCheckOut, CheckInCheckOutStatus},
        id::{CheckInCheckOutId, ReservationDetailId, ReservationId, RoomId},
        lifecycle::Lifecycle,
        reservation::{
            availability::{find_conflict, RoomBooking, StayWindow},
            event::{
                CancelReservation, CheckIn, CompleteReservation, ConfirmReservation,
                CreateReservation, RoomAvailabilityQuery,
            },
            Reservation, ReservationAction, ReservationDetail, ReservationStatus, StatusChange,
        },
    },
    repository::reservation::ReservationRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::SqliteConnection;

use crate::{
    database::{
        map_commit_error, map_write_error,
        model::{
            check_in_out::CheckInCheckOutRow,
            reservation::{ReservationDetailRow, ReservationRow, RoomBookingRow, StatusChangeRow},
        },
        ConnectionPool,
    },
    lock::LockTable,
    repository::catalog::{acquire, ensure_active_client},
};

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
    room_locks: Arc<LockTable<RoomId>>,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    #[tracing::instrument(skip_all, fields(client_id = %event.client_id), err)]
    async fn create(&self, event: CreateReservation) -> AppResult<ReservationId> {
        let window = event.validate()?;
        let room_ids = event.room_ids();

        let _locks = self.room_locks.acquire_all(room_ids.iter().copied()).await?;
        let mut tx = self.db.begin().await?;

        // ① the client must exist, ② every room must exist and be free.
        // Nothing is written before both checks pass.
        {
            ensure_active_client(&mut tx, event.client_id).await?;
            lock_rooms(&mut tx, &room_ids).await?;
            ensure_rooms_free(&mut tx, &room_ids, &window, None).await?;
        }

        let reservation_id = ReservationId::new();
        sqlx::query(
            r#"
                INSERT INTO reservations
                (reservation_id, client_id, created_at, start_at, end_at, status, is_active)
                VALUES (?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(reservation_id)
        .bind(event.client_id)
        .bind(event.requested_at)
        .bind(window.start())
        .bind(window.end())
        .bind(ReservationStatus::Pending.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        for room in &event.rooms {
            sqlx::query(
                r#"
                    INSERT INTO reservation_details
                    (detail_id, reservation_id, room_id, note, is_active)
                    VALUES (?, ?, ?, ?, 1)
                "#,
            )
            .bind(ReservationDetailId::new())
            .bind(reservation_id)
            .bind(room.room_id)
            .bind(&room.note)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        record_status_change(
            &mut tx,
            reservation_id,
            None,
            ReservationStatus::Pending,
            event.requested_at,
        )
        .await?;

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%reservation_id, rooms = room_ids.len(), "reservation created");
        Ok(reservation_id)
    }

    #[tracing::instrument(skip_all, fields(reservation_id = %event.reservation_id), err)]
    async fn confirm(&self, event: ConfirmReservation) -> AppResult<()> {
        let reservation_id = event.reservation_id;
        // Details never gain rooms after creation, so the rooms read here
        // cover everything the transaction below can touch.
        let room_ids = {
            let mut conn = acquire(&self.db).await?;
            active_room_ids(&mut conn, reservation_id).await?
        };

        let _locks = self.room_locks.acquire_all(room_ids.iter().copied()).await?;
        let mut tx = self.db.begin().await?;

        let header = fetch_header(&mut tx, reservation_id).await?;
        let from = header.status()?;
        let to = from.apply(ReservationAction::Confirm)?;

        let room_ids = active_room_ids(&mut tx, reservation_id).await?;
        let window = StayWindow::new(header.start_at, header.end_at)?;
        lock_rooms(&mut tx, &room_ids).await?;
        ensure_rooms_free(&mut tx, &room_ids, &window, Some(reservation_id)).await?;

        set_status(&mut tx, reservation_id, from, to, event.confirmed_at).await?;
        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%reservation_id, "reservation confirmed");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(reservation_id = %event.reservation_id), err)]
    async fn check_in(&self, event: CheckIn) -> AppResult<Vec<CheckInCheckOutId>> {
        let reservation_id = event.reservation_id;
        let mut tx = self.db.begin().await?;

        let header = fetch_header(&mut tx, reservation_id).await?;
        let from = header.status()?;
        let to = from.apply(ReservationAction::CheckIn)?;
        set_status(&mut tx, reservation_id, from, to, event.checked_in_at).await?;

        let details = fetch_details(&mut tx, reservation_id).await?;
        let mut opened = Vec::new();
        for detail in details.iter().filter(|d| d.is_active) {
            let id = CheckInCheckOutId::new();
            sqlx::query(
                r#"
                    INSERT INTO check_in_check_outs
                    (check_in_check_out_id, detail_id, checked_in_at, checked_out_at, status)
                    VALUES (?, ?, ?, NULL, ?)
                "#,
            )
            .bind(id)
            .bind(detail.detail_id)
            .bind(event.checked_in_at)
            .bind(CheckInCheckOutStatus::Pending.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
            opened.push(id);
        }

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%reservation_id, rooms = opened.len(), "guests checked in");
        Ok(opened)
    }

    #[tracing::instrument(skip_all, fields(reservation_id = %event.reservation_id), err)]
    async fn complete(&self, event: CompleteReservation) -> AppResult<()> {
        let reservation_id = event.reservation_id;
        let mut tx = self.db.begin().await?;

        let header = fetch_header(&mut tx, reservation_id).await?;
        let from = header.status()?;
        let to = from.apply(ReservationAction::Complete)?;

        let open = fetch_check_in_check_outs(&mut tx, reservation_id)
            .await?
            .into_iter()
            .filter(|record| !record.is_done())
            .count();
        if open > 0 {
            return Err(AppError::IncompleteCheckout(format!(
                "reservation ({reservation_id}) still has {open} room(s) to check out"
            )));
        }

        set_status(&mut tx, reservation_id, from, to, event.completed_at).await?;
        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%reservation_id, "reservation completed");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(reservation_id = %event.reservation_id), err)]
    async fn cancel(&self, event: CancelReservation) -> AppResult<()> {
        let reservation_id = event.reservation_id;
        let mut tx = self.db.begin().await?;

        let header = fetch_header(&mut tx, reservation_id).await?;
        let from = header.status()?;
        let to = from.apply(ReservationAction::Cancel)?;
        set_status(&mut tx, reservation_id, from, to, event.cancelled_at).await?;

        // details stay as tombstones; they no longer hold their rooms
        sqlx::query(
            r#"
                UPDATE reservation_details
                SET is_active = 0
                WHERE reservation_id = ?
            "#,
        )
        .bind(reservation_id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%reservation_id, "reservation cancelled");
        Ok(())
    }

    async fn is_room_available(&self, query: RoomAvailabilityQuery) -> AppResult<bool> {
        let window = StayWindow::new(query.start_at, query.end_at)?;
        let mut conn = acquire(&self.db).await?;

        let is_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM rooms WHERE room_id = ?")
                .bind(query.room_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(AppError::SpecificOperationError)?;
        if is_active != Some(true) {
            return Err(room_not_found(query.room_id));
        }

        let bookings = blocking_bookings(&mut conn, query.room_id).await?;
        Ok(find_conflict(&bookings, &window, query.exclude_reservation_id).is_none())
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>> {
        let mut conn = acquire(&self.db).await?;
        let header: Option<ReservationRow> = sqlx::query_as(
            r#"
                SELECT reservation_id, client_id, created_at, start_at, end_at, status, is_active
                FROM reservations
                WHERE reservation_id = ?
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::SpecificOperationError)?;

        match header {
            None => Ok(None),
            Some(header) => {
                let details = fetch_details(&mut conn, reservation_id).await?;
                header.into_reservation(details).map(Some)
            }
        }
    }

    async fn find_check_in_check_outs(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<CheckInCheckOut>> {
        let mut conn = acquire(&self.db).await?;
        fetch_check_in_check_outs(&mut conn, reservation_id).await
    }

    async fn find_status_history(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<StatusChange>> {
        let rows: Vec<StatusChangeRow> = sqlx::query_as(
            r#"
                SELECT from_status, to_status, changed_at
                FROM reservation_status_history
                WHERE reservation_id = ?
                ORDER BY history_id ASC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(StatusChange::try_from).collect()
    }
}

fn room_not_found(room_id: RoomId) -> AppError {
    AppError::EntityNotFound(format!("room ({room_id}) was not found or is inactive"))
}

// Takes the write lock on each room row, in ascending id order, before any
// booking is read. Concurrent writers on the same rooms queue up here.
async fn lock_rooms(conn: &mut SqliteConnection, room_ids: &[RoomId]) -> AppResult<()> {
    let mut ordered = room_ids.to_vec();
    ordered.sort();
    ordered.dedup();

    for room_id in ordered {
        let res = sqlx::query(
            r#"
                UPDATE rooms
                SET lock_version = lock_version + 1
                WHERE room_id = ? AND is_active = 1
            "#,
        )
        .bind(room_id)
        .execute(&mut *conn)
        .await
        .map_err(map_write_error)?;

        if res.rows_affected() < 1 {
            return Err(room_not_found(room_id));
        }
    }
    Ok(())
}

async fn ensure_rooms_free(
    conn: &mut SqliteConnection,
    room_ids: &[RoomId],
    window: &StayWindow,
    exclude: Option<ReservationId>,
) -> AppResult<()> {
    for &room_id in room_ids {
        let bookings = blocking_bookings(conn, room_id).await?;
        if let Some(conflict) = find_conflict(&bookings, window, exclude) {
            tracing::warn!(
                %room_id,
                conflicting_reservation = %conflict.reservation_id,
                "room is already booked for the requested stay"
            );
            return Err(AppError::RoomUnavailable(format!(
                "room ({room_id}) is booked from {} to {} by reservation ({})",
                conflict.window.start(),
                conflict.window.end(),
                conflict.reservation_id
            )));
        }
    }
    Ok(())
}

async fn blocking_bookings(
    conn: &mut SqliteConnection,
    room_id: RoomId,
) -> AppResult<Vec<RoomBooking>> {
    let [pending, confirmed, checked_in] = ReservationStatus::BLOCKING.map(|s| s.to_string());
    let rows: Vec<RoomBookingRow> = sqlx::query_as(
        r#"
            SELECT r.reservation_id, d.room_id, r.status, r.start_at, r.end_at
            FROM reservation_details AS d
            INNER JOIN reservations AS r ON d.reservation_id = r.reservation_id
            WHERE d.room_id = ?
              AND d.is_active = 1
              AND r.is_active = 1
              AND r.status IN (?, ?, ?)
        "#,
    )
    .bind(room_id)
    .bind(pending)
    .bind(confirmed)
    .bind(checked_in)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_write_error)?;

    rows.into_iter().map(RoomBooking::try_from).collect()
}

async fn fetch_header(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
) -> AppResult<ReservationRow> {
    sqlx::query_as(
        r#"
            SELECT reservation_id, client_id, created_at, start_at, end_at, status, is_active
            FROM reservations
            WHERE reservation_id = ? AND is_active = 1
        "#,
    )
    .bind(reservation_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_write_error)?
    .ok_or_else(|| {
        AppError::EntityNotFound(format!("reservation ({reservation_id}) was not found"))
    })
}

async fn fetch_details(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
) -> AppResult<Vec<ReservationDetail>> {
    let rows: Vec<ReservationDetailRow> = sqlx::query_as(
        r#"
            SELECT detail_id, reservation_id, room_id, note, is_active
            FROM reservation_details
            WHERE reservation_id = ?
            ORDER BY room_id ASC
        "#,
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_write_error)?;

    Ok(rows.into_iter().map(ReservationDetail::from).collect())
}

async fn active_room_ids(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
) -> AppResult<Vec<RoomId>> {
    Ok(fetch_details(conn, reservation_id)
        .await?
        .into_iter()
        .filter(|d| d.is_active)
        .map(|d| d.room_id)
        .collect())
}

async fn fetch_check_in_check_outs(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
) -> AppResult<Vec<CheckInCheckOut>> {
    let rows: Vec<CheckInCheckOutRow> = sqlx::query_as(
        r#"
            SELECT c.check_in_check_out_id, c.detail_id, c.checked_in_at,
            c.checked_out_at, c.status
            FROM check_in_check_outs AS c
            INNER JOIN reservation_details AS d ON c.detail_id = d.detail_id
            WHERE d.reservation_id = ?
            ORDER BY c.checked_in_at ASC
        "#,
    )
    .bind(reservation_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(map_write_error)?;

    rows.into_iter().map(CheckInCheckOut::try_from).collect()
}

// Compare-and-set on the current status, followed by a history row.
async fn set_status(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
    from: ReservationStatus,
    to: ReservationStatus,
    at: DateTime<Utc>,
) -> AppResult<()> {
    let res = sqlx::query(
        r#"
            UPDATE reservations
            SET status = ?
            WHERE reservation_id = ? AND status = ?
        "#,
    )
    .bind(to.to_string())
    .bind(reservation_id)
    .bind(from.to_string())
    .execute(&mut *conn)
    .await
    .map_err(map_write_error)?;

    if res.rows_affected() < 1 {
        return Err(AppError::Conflict(format!(
            "reservation ({reservation_id}) changed while moving from {from} to {to}"
        )));
    }

    record_status_change(conn, reservation_id, Some(from), to, at).await
}

async fn record_status_change(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
    from: Option<ReservationStatus>,
    to: ReservationStatus,
    at: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
            INSERT INTO reservation_status_history
            (reservation_id, from_status, to_status, changed_at)
            VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(reservation_id)
    .bind(from.map(|s| s.to_string()))
    .bind(to.to_string())
    .bind(at)
    .execute(&mut *conn)
    .await
    .map_err(map_write_error)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        database::testing::{file_pool, memory_pool},
        repository::{
            catalog::{tests::guest, CatalogRepositoryImpl},
            check_in_out::CheckInCheckOutRepositoryImpl,
        },
    };
    use chrono::{Duration, TimeZone};
    use kernel::{
        model::{
            check_in_out::event::CheckOut,
            id::ClientId,
            reservation::{event::RequestedRoom, is_legal_history},
            room::{RegisterRoom, RoomCategory},
        },
        repository::{catalog::CatalogRepository, check_in_out::CheckInCheckOutRepository},
    };
    use shared::config::LockConfig;

    pub(crate) struct Hotel {
        pub db: ConnectionPool,
        pub reservations: Arc<ReservationRepositoryImpl>,
        pub catalog: CatalogRepositoryImpl,
        pub client_id: ClientId,
    }

    impl Hotel {
        pub(crate) async fn open() -> Hotel {
            Hotel::on(memory_pool().await).await
        }

        pub(crate) async fn on(db: ConnectionPool) -> Hotel {
            let catalog = CatalogRepositoryImpl::new(db.clone());
            let client_id = catalog.register_client(guest(1)).await.unwrap();
            let locks = Arc::new(LockTable::new(LockConfig::default()));
            Hotel {
                reservations: Arc::new(ReservationRepositoryImpl::new(db.clone(), locks)),
                db,
                catalog,
                client_id,
            }
        }

        pub(crate) async fn room(&self, number: &str) -> RoomId {
            self.catalog
                .register_room(RegisterRoom::new(number.into(), 2, RoomCategory::Double))
                .await
                .unwrap()
        }

        pub(crate) async fn book(
            &self,
            rooms: &[RoomId],
            start: u32,
            end: u32,
        ) -> AppResult<ReservationId> {
            let rooms = rooms
                .iter()
                .map(|&room_id| RequestedRoom::new(room_id, String::new()))
                .collect();
            self.reservations
                .create(CreateReservation::new(
                    self.client_id,
                    june(start),
                    june(end),
                    rooms,
                    june(1) - Duration::days(30),
                ))
                .await
        }

        pub(crate) async fn status(&self, reservation_id: ReservationId) -> ReservationStatus {
            self.reservations
                .find_by_id(reservation_id)
                .await
                .unwrap()
                .unwrap()
                .status
        }
    }

    pub(crate) fn june(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 14, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_half_open_booking_scenario() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room_101 = hotel.room("101").await;

        let a = hotel.book(&[room_101], 1, 5).await?;
        let b = hotel.book(&[room_101], 3, 7).await;
        let c = hotel.book(&[room_101], 5, 8).await;

        assert!(matches!(b, Err(AppError::RoomUnavailable(_))));
        let c = c?;
        assert_ne!(a, c);
        assert_eq!(hotel.status(a).await, ReservationStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_multi_room_booking_persists_nothing() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let (r101, r102) = (hotel.room("101").await, hotel.room("102").await);
        hotel.book(&[r102], 1, 5).await?;

        let res = hotel.book(&[r101, r102], 2, 4).await;
        assert!(matches!(res, Err(AppError::RoomUnavailable(_))));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(hotel.db.inner_ref())
            .await?;
        assert_eq!(count, 1);
        assert!(
            hotel
                .reservations
                .is_room_available(RoomAvailabilityQuery::new(r101, june(2), june(4), None))
                .await?
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_or_inactive_room_is_not_found() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let res = hotel.book(&[RoomId::new()], 1, 3).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        let room = hotel.room("101").await;
        sqlx::query("UPDATE rooms SET is_active = 0 WHERE room_id = ?")
            .bind(room)
            .execute(hotel.db.inner_ref())
            .await?;
        let res = hotel.book(&[room], 1, 3).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        let res = hotel
            .reservations
            .is_room_available(RoomAvailabilityQuery::new(room, june(1), june(3), None))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let res = hotel
            .reservations
            .create(CreateReservation::new(
                ClientId::new(),
                june(1),
                june(2),
                vec![RequestedRoom::new(room, String::new())],
                june(1),
            ))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
    }

    #[tokio::test]
    async fn test_availability_query() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let id = hotel.book(&[room], 1, 5).await?;
        let query =
            |start, end, exclude| RoomAvailabilityQuery::new(room, june(start), june(end), exclude);

        assert!(!hotel.reservations.is_room_available(query(4, 6, None)).await?);
        assert!(hotel.reservations.is_room_available(query(5, 6, None)).await?);
        assert!(hotel.reservations.is_room_available(query(2, 3, Some(id))).await?);
        assert!(matches!(
            hotel.reservations.is_room_available(query(6, 6, None)).await,
            Err(AppError::InvalidRange(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_releases_the_room() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let first = hotel.book(&[room], 1, 5).await?;

        hotel
            .reservations
            .cancel(CancelReservation::new(first, june(1)))
            .await?;
        assert_eq!(hotel.status(first).await, ReservationStatus::Cancelled);
        let reservation = hotel.reservations.find_by_id(first).await?.unwrap();
        assert!(reservation.details.iter().all(|d| !d.is_active));

        hotel.book(&[room], 2, 4).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_twice_is_an_invalid_transition() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let id = hotel.book(&[room], 1, 5).await?;
        hotel
            .reservations
            .cancel(CancelReservation::new(id, june(1)))
            .await?;

        let res = hotel
            .reservations
            .cancel(CancelReservation::new(id, june(1)))
            .await;
        assert!(matches!(res, Err(AppError::InvalidTransition(_))));
        assert_eq!(hotel.status(id).await, ReservationStatus::Cancelled);
        assert_eq!(hotel.reservations.find_status_history(id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_rechecks_availability() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let id = hotel.book(&[room], 1, 5).await?;

        // a conflicting row slipped in behind the engine's back
        let intruder = ReservationId::new();
        sqlx::query(
            "INSERT INTO reservations VALUES (?, ?, ?, ?, ?, 'CONFIRMED', 1)",
        )
        .bind(intruder)
        .bind(hotel.client_id)
        .bind(june(1))
        .bind(june(2))
        .bind(june(3))
        .execute(hotel.db.inner_ref())
        .await?;
        sqlx::query("INSERT INTO reservation_details VALUES (?, ?, ?, '', 1)")
            .bind(ReservationDetailId::new())
            .bind(intruder)
            .bind(room)
            .execute(hotel.db.inner_ref())
            .await?;

        let res = hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await;
        assert!(matches!(res, Err(AppError::RoomUnavailable(_))));
        assert_eq!(hotel.status(id).await, ReservationStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_does_not_conflict_with_itself() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let id = hotel.book(&[room], 1, 5).await?;

        hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await?;
        assert_eq!(hotel.status(id).await, ReservationStatus::Confirmed);

        let again = hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await;
        assert!(matches!(again, Err(AppError::InvalidTransition(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_requires_confirmation() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let (r101, r102) = (hotel.room("101").await, hotel.room("102").await);
        let id = hotel.book(&[r101, r102], 1, 5).await?;

        let early = hotel.reservations.check_in(CheckIn::new(id, june(1))).await;
        assert!(matches!(early, Err(AppError::InvalidTransition(_))));
        assert!(hotel.reservations.find_check_in_check_outs(id).await?.is_empty());

        hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await?;
        let opened = hotel.reservations.check_in(CheckIn::new(id, june(1))).await?;

        assert_eq!(opened.len(), 2);
        let records = hotel.reservations.find_check_in_check_outs(id).await?;
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.status == CheckInCheckOutStatus::Pending && r.checked_in_at == june(1)));
        assert_eq!(hotel.status(id).await, ReservationStatus::CheckedIn);
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_waits_for_every_checkout() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let (r101, r102) = (hotel.room("101").await, hotel.room("102").await);
        let id = hotel.book(&[r101, r102], 1, 5).await?;
        hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await?;
        let opened = hotel.reservations.check_in(CheckIn::new(id, june(1))).await?;
        let stays = CheckInCheckOutRepositoryImpl::new(hotel.db.clone());

        stays.check_out(CheckOut::new(opened[0], june(5))).await?;
        let res = hotel
            .reservations
            .complete(CompleteReservation::new(id, june(5)))
            .await;
        assert!(matches!(res, Err(AppError::IncompleteCheckout(_))));
        assert_eq!(hotel.status(id).await, ReservationStatus::CheckedIn);

        stays.check_out(CheckOut::new(opened[1], june(5))).await?;
        hotel
            .reservations
            .complete(CompleteReservation::new(id, june(5)))
            .await?;
        assert_eq!(hotel.status(id).await, ReservationStatus::Completed);

        let history = hotel.reservations.find_status_history(id).await?;
        assert!(is_legal_history(&history));
        assert_eq!(
            history.iter().map(|c| c.to).collect::<Vec<_>>(),
            vec![
                ReservationStatus::Pending,
                ReservationStatus::Confirmed,
                ReservationStatus::CheckedIn,
                ReservationStatus::Completed,
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_completed_stay_frees_the_room() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let id = hotel.book(&[room], 1, 5).await?;
        hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await?;
        let opened = hotel.reservations.check_in(CheckIn::new(id, june(1))).await?;
        CheckInCheckOutRepositoryImpl::new(hotel.db.clone())
            .check_out(CheckOut::new(opened[0], june(3)))
            .await?;
        hotel
            .reservations
            .complete(CompleteReservation::new(id, june(3)))
            .await?;

        hotel.book(&[room], 3, 5).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_after_check_in_is_rejected() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let id = hotel.book(&[room], 1, 5).await?;
        hotel
            .reservations
            .confirm(ConfirmReservation::new(id, june(1)))
            .await?;
        hotel.reservations.check_in(CheckIn::new(id, june(1))).await?;

        let res = hotel
            .reservations
            .cancel(CancelReservation::new(id, june(2)))
            .await;
        assert!(matches!(res, Err(AppError::InvalidTransition(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_transitions_on_unknown_reservation_are_not_found() {
        let hotel = Hotel::open().await;
        let id = ReservationId::new();
        let repo = &hotel.reservations;

        assert!(matches!(
            repo.confirm(ConfirmReservation::new(id, june(1))).await,
            Err(AppError::EntityNotFound(_))
        ));
        assert!(matches!(
            repo.check_in(CheckIn::new(id, june(1))).await,
            Err(AppError::EntityNotFound(_))
        ));
        assert!(matches!(
            repo.complete(CompleteReservation::new(id, june(1))).await,
            Err(AppError::EntityNotFound(_))
        ));
        assert!(matches!(
            repo.cancel(CancelReservation::new(id, june(1))).await,
            Err(AppError::EntityNotFound(_))
        ));
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(24))]

        #[test]
        fn test_accepted_bookings_never_overlap(
            requests in proptest::collection::vec((0usize..3, 1u32..20, 1u32..6, proptest::bool::ANY), 1..25)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let hotel = Hotel::open().await;
                let rooms = [
                    hotel.room("101").await,
                    hotel.room("102").await,
                    hotel.room("103").await,
                ];

                let mut accepted: Vec<(RoomId, u32, u32)> = Vec::new();
                for (room, start, nights, cancel) in requests {
                    let end = start + nights;
                    match hotel.book(&[rooms[room]], start, end).await {
                        Ok(id) if cancel => {
                            hotel
                                .reservations
                                .cancel(CancelReservation::new(id, june(1)))
                                .await
                                .unwrap();
                        }
                        Ok(_) => accepted.push((rooms[room], start, end)),
                        Err(AppError::RoomUnavailable(_)) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }

                for (i, a) in accepted.iter().enumerate() {
                    for b in &accepted[i + 1..] {
                        assert!(a.0 != b.0 || a.2 <= b.1 || b.2 <= a.1, "{a:?} overlaps {b:?}");
                    }
                }
            });
        }
    }

    #[tokio::test]
    async fn test_concurrent_bookings_for_one_room_admit_one() -> anyhow::Result<()> {
        let hotel = Arc::new(Hotel::open().await);
        let room = hotel.room("101").await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let hotel = hotel.clone();
            handles.push(tokio::spawn(async move { hotel.book(&[room], 1, 5).await }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => admitted += 1,
                Err(AppError::RoomUnavailable(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(admitted, 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_on_separate_rooms_all_succeed() -> anyhow::Result<()> {
        let (_dir, db) = file_pool().await;
        let hotel = Arc::new(Hotel::on(db).await);
        let mut rooms = Vec::new();
        for n in 0..16 {
            rooms.push(hotel.room(&format!("{}", 201 + n)).await);
        }

        let mut handles = Vec::new();
        for room in rooms {
            let hotel = hotel.clone();
            handles.push(tokio::spawn(async move { hotel.book(&[room], 1, 5).await }));
        }
        for handle in handles {
            handle.await??;
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(hotel.db.inner_ref())
            .await?;
        assert_eq!(count, 16);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_writers_without_a_shared_lock_table_still_admit_one() -> anyhow::Result<()> {
        let (_dir, db) = file_pool().await;
        let hotel = Hotel::on(db.clone()).await;
        let room = hotel.room("101").await;

        // each writer has its own lock table, like separate processes
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = ReservationRepositoryImpl::new(
                db.clone(),
                Arc::new(LockTable::new(LockConfig::default())),
            );
            let event = CreateReservation::new(
                hotel.client_id,
                june(1),
                june(5),
                vec![RequestedRoom::new(room, String::new())],
                june(1),
            );
            handles.push(tokio::spawn(async move { repo.create(event).await }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => admitted += 1,
                Err(AppError::RoomUnavailable(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(admitted, 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mixed_bookings_never_overlap() -> anyhow::Result<()> {
        let (_dir, db) = file_pool().await;
        let hotel = Arc::new(Hotel::on(db).await);
        let rooms = [
            hotel.room("101").await,
            hotel.room("102").await,
            hotel.room("103").await,
        ];

        let mut handles = Vec::new();
        for i in 0..24u32 {
            let hotel = hotel.clone();
            let wanted: Vec<RoomId> = if i % 5 == 0 {
                vec![rooms[0], rooms[(i as usize / 5) % 2 + 1]]
            } else {
                vec![rooms[i as usize % 3]]
            };
            let start = 1 + (i * 7) % 20;
            let end = start + 1 + i % 4;
            handles.push(tokio::spawn(async move {
                let res = hotel.book(&wanted, start, end).await;
                (wanted, start, end, res)
            }));
        }

        let mut accepted: Vec<(RoomId, u32, u32)> = Vec::new();
        for handle in handles {
            let (wanted, start, end, res) = handle.await?;
            match res {
                Ok(_) => accepted.extend(wanted.into_iter().map(|room| (room, start, end))),
                Err(AppError::RoomUnavailable(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert!(!accepted.is_empty());
        for (i, a) in accepted.iter().enumerate() {
            for b in &accepted[i + 1..] {
                assert!(a.0 != b.0 || a.2 <= b.1 || b.2 <= a.1, "{a:?} overlaps {b:?}");
            }
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_confirms_of_separate_reservations_all_succeed() -> anyhow::Result<()>
    {
        let (_dir, db) = file_pool().await;
        let hotel = Arc::new(Hotel::on(db).await);
        let mut ids = Vec::new();
        for n in 0..8 {
            let room = hotel.room(&format!("{}", 301 + n)).await;
            ids.push(hotel.book(&[room], 1, 5).await?);
        }

        let mut handles = Vec::new();
        for &id in &ids {
            let hotel = hotel.clone();
            handles.push(tokio::spawn(async move {
                hotel
                    .reservations
                    .confirm(ConfirmReservation::new(id, june(1)))
                    .await
            }));
        }
        for handle in handles {
            handle.await??;
        }

        for id in ids {
            assert_eq!(hotel.status(id).await, ReservationStatus::Confirmed);
        }
        Ok(())
    }
}
