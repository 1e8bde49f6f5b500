use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        client::{Client, RegisterClient},
        id::{ClientId, RoomId, ServiceAvailabilityId, ServiceId},
        room::{RegisterRoom, Room, RoomStatus},
        service::{
            event::{RegisterService, RegisterServiceAvailability},
            slot::{weekday_index, ServiceAvailability},
            Service,
        },
    },
    repository::catalog::CatalogRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::SqliteConnection;

use crate::database::{
    model::catalog::{ClientRow, RoomRow, ServiceAvailabilityRow, ServiceRow},
    ConnectionPool,
};

#[derive(new)]
pub struct CatalogRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn register_room(&self, event: RegisterRoom) -> AppResult<RoomId> {
        if event.room_number.trim().is_empty() || event.capacity < 1 {
            return Err(AppError::UnprocessableEntity(format!(
                "room needs a number and a positive capacity: {:?}",
                event
            )));
        }
        let room_id = RoomId::new();
        sqlx::query(
            r#"
                INSERT INTO rooms (room_id, room_number, capacity, category, status, is_active)
                VALUES (?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(room_id)
        .bind(&event.room_number)
        .bind(event.capacity)
        .bind(event.category.to_string())
        .bind(RoomStatus::Available.to_string())
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_unique_violation(e, format!("room number {}", event.room_number)))?;

        Ok(room_id)
    }

    async fn register_client(&self, event: RegisterClient) -> AppResult<ClientId> {
        let client_id = ClientId::new();
        sqlx::query(
            r#"
                INSERT INTO clients
                (client_id, first_name, last_name, email, identification_type,
                identification_number, external_identity_id, birth_date, is_active)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(client_id)
        .bind(&event.first_name)
        .bind(&event.last_name)
        .bind(&event.email)
        .bind(&event.identification_type)
        .bind(&event.identification_number)
        .bind(&event.external_identity_id)
        .bind(event.birth_date)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| {
            map_unique_violation(
                e,
                format!(
                    "identification {} {}",
                    event.identification_type, event.identification_number
                ),
            )
        })?;

        Ok(client_id)
    }

    async fn register_service(&self, event: RegisterService) -> AppResult<ServiceId> {
        event.validate()?;
        let service_id = ServiceId::new();
        sqlx::query(
            r#"
                INSERT INTO services (service_id, name, service_type, unit_price, is_active)
                VALUES (?, ?, ?, ?, 1)
            "#,
        )
        .bind(service_id)
        .bind(&event.name)
        .bind(event.service_type.to_string())
        .bind(event.unit_price)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(service_id)
    }

    async fn register_service_availability(
        &self,
        event: RegisterServiceAvailability,
    ) -> AppResult<ServiceAvailabilityId> {
        event.validate()?;
        let mut conn = acquire(&self.db).await?;
        if fetch_service(&mut conn, event.service_id).await?.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "service ({}) was not found",
                event.service_id
            )));
        }

        let availability_id = ServiceAvailabilityId::new();
        sqlx::query(
            r#"
                INSERT INTO service_availabilities
                (availability_id, service_id, day_of_week, start_time, end_time,
                max_capacity, fixed_time, is_active)
                VALUES (?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(availability_id)
        .bind(event.service_id)
        .bind(weekday_index(event.day_of_week))
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.max_capacity)
        .bind(event.fixed_time)
        .execute(&mut *conn)
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(availability_id)
    }

    async fn find_room(&self, room_id: RoomId) -> AppResult<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(
            r#"
                SELECT room_id, room_number, capacity, category, status, is_active
                FROM rooms
                WHERE room_id = ?
            "#,
        )
        .bind(room_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(Room::try_from).transpose()
    }

    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        let mut conn = acquire(&self.db).await?;
        fetch_client(&mut conn, client_id).await
    }

    async fn find_service(&self, service_id: ServiceId) -> AppResult<Option<Service>> {
        let mut conn = acquire(&self.db).await?;
        fetch_service(&mut conn, service_id).await
    }

    async fn find_service_availability(
        &self,
        availability_id: ServiceAvailabilityId,
    ) -> AppResult<Option<ServiceAvailability>> {
        let mut conn = acquire(&self.db).await?;
        fetch_service_availability(&mut conn, availability_id).await
    }
}

pub(crate) async fn acquire(
    db: &ConnectionPool,
) -> AppResult<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
    db.inner_ref()
        .acquire()
        .await
        .map_err(crate::database::map_write_error)
}

pub(crate) async fn fetch_client(
    conn: &mut SqliteConnection,
    client_id: ClientId,
) -> AppResult<Option<Client>> {
    let row: Option<ClientRow> = sqlx::query_as(
        r#"
            SELECT client_id, first_name, last_name, email, identification_type,
            identification_number, external_identity_id, birth_date, is_active
            FROM clients
            WHERE client_id = ?
        "#,
    )
    .bind(client_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    Ok(row.map(Client::from))
}

pub(crate) async fn fetch_service(
    conn: &mut SqliteConnection,
    service_id: ServiceId,
) -> AppResult<Option<Service>> {
    let row: Option<ServiceRow> = sqlx::query_as(
        r#"
            SELECT service_id, name, service_type, unit_price, is_active
            FROM services
            WHERE service_id = ?
        "#,
    )
    .bind(service_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    row.map(Service::try_from).transpose()
}

pub(crate) async fn fetch_service_availability(
    conn: &mut SqliteConnection,
    availability_id: ServiceAvailabilityId,
) -> AppResult<Option<ServiceAvailability>> {
    let row: Option<ServiceAvailabilityRow> = sqlx::query_as(
        r#"
            SELECT availability_id, service_id, day_of_week, start_time, end_time,
            max_capacity, fixed_time, is_active
            FROM service_availabilities
            WHERE availability_id = ?
        "#,
    )
    .bind(availability_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    row.map(ServiceAvailability::try_from).transpose()
}

/// Resolves an active client, or fails with `EntityNotFound`.
pub(crate) async fn ensure_active_client(
    conn: &mut SqliteConnection,
    client_id: ClientId,
) -> AppResult<Client> {
    fetch_client(conn, client_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::EntityNotFound(format!("client ({client_id}) was not found")))
}

fn map_unique_violation(e: sqlx::Error, what: String) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::UnprocessableEntity(format!("{what} is already registered"))
        }
        _ => AppError::SpecificOperationError(e),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::testing::memory_pool;
    use chrono::{NaiveTime, Weekday};
    use kernel::model::{room::RoomCategory, service::ServiceType};

    pub(crate) fn guest(n: u32) -> RegisterClient {
        RegisterClient::new(
            format!("Guest{n}"),
            "Tanaka".into(),
            format!("guest{n}@example.com"),
            "PASSPORT".into(),
            format!("TK{n:06}"),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_register_and_find_room() -> anyhow::Result<()> {
        let repo = CatalogRepositoryImpl::new(memory_pool().await);

        let room_id = repo
            .register_room(RegisterRoom::new("101".into(), 2, RoomCategory::Double))
            .await?;
        let room = repo.find_room(room_id).await?.unwrap();

        assert_eq!(room.room_number, "101");
        assert_eq!(room.capacity, 2);
        assert_eq!(room.category, RoomCategory::Double);
        assert_eq!(room.status, RoomStatus::Available);
        assert!(room.is_active);
        assert!(repo.find_room(RoomId::new()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_room_number_is_rejected() -> anyhow::Result<()> {
        let repo = CatalogRepositoryImpl::new(memory_pool().await);
        repo.register_room(RegisterRoom::new("101".into(), 2, RoomCategory::Double))
            .await?;

        let res = repo
            .register_room(RegisterRoom::new("101".into(), 1, RoomCategory::Single))
            .await;
        assert!(matches!(res, Err(AppError::UnprocessableEntity(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_client() -> anyhow::Result<()> {
        let repo = CatalogRepositoryImpl::new(memory_pool().await);
        let client_id = repo.register_client(guest(1)).await?;

        let client = repo.find_client(client_id).await?.unwrap();
        assert_eq!(client.first_name, "Guest1");
        assert_eq!(client.identification_number, "TK000001");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_service_with_slot() -> anyhow::Result<()> {
        let repo = CatalogRepositoryImpl::new(memory_pool().await);
        let service_id = repo
            .register_service(RegisterService::new("Spa".into(), ServiceType::Paid, 4_500))
            .await?;
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let availability_id = repo
            .register_service_availability(RegisterServiceAvailability::new(
                service_id,
                Weekday::Mon,
                nine,
                None,
                4,
                true,
            ))
            .await?;

        let service = repo.find_service(service_id).await?.unwrap();
        assert_eq!(service.unit_price, 4_500);
        let slot = repo.find_service_availability(availability_id).await?.unwrap();
        assert_eq!(slot.day_of_week, Weekday::Mon);
        assert_eq!(slot.start_time, nine);
        assert_eq!(slot.max_capacity, 4);
        assert_eq!(slot.service_id, service_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_slot_for_unknown_service_is_not_found() {
        let repo = CatalogRepositoryImpl::new(memory_pool().await);
        let res = repo
            .register_service_availability(RegisterServiceAvailability::new(
                ServiceId::new(),
                Weekday::Mon,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                None,
                4,
                true,
            ))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
    }
}
