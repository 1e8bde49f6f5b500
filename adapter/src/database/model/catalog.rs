use kernel::model::{
    client::Client,
    id::{ClientId, RoomId, ServiceAvailabilityId, ServiceId},
    room::Room,
    service::{
        slot::{weekday_from_index, ServiceAvailability},
        Service,
    },
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{NaiveDate, NaiveTime};

use super::parse_column;

#[derive(sqlx::FromRow)]
pub struct RoomRow {
    pub room_id: RoomId,
    pub room_number: String,
    pub capacity: i32,
    pub category: String,
    pub status: String,
    pub is_active: bool,
}

impl TryFrom<RoomRow> for Room {
    type Error = AppError;

    fn try_from(value: RoomRow) -> AppResult<Self> {
        let RoomRow {
            room_id,
            room_number,
            capacity,
            category,
            status,
            is_active,
        } = value;
        Ok(Room {
            room_id,
            room_number,
            capacity,
            category: parse_column("room category", &category)?,
            status: parse_column("room status", &status)?,
            is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct ClientRow {
    pub client_id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub identification_type: String,
    pub identification_number: String,
    pub external_identity_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl From<ClientRow> for Client {
    fn from(value: ClientRow) -> Self {
        let ClientRow {
            client_id,
            first_name,
            last_name,
            email,
            identification_type,
            identification_number,
            external_identity_id,
            birth_date,
            is_active,
        } = value;
        Client {
            client_id,
            first_name,
            last_name,
            email,
            identification_type,
            identification_number,
            external_identity_id,
            birth_date,
            is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ServiceRow {
    pub service_id: ServiceId,
    pub name: String,
    pub service_type: String,
    pub unit_price: i64,
    pub is_active: bool,
}

impl TryFrom<ServiceRow> for Service {
    type Error = AppError;

    fn try_from(value: ServiceRow) -> AppResult<Self> {
        let ServiceRow {
            service_id,
            name,
            service_type,
            unit_price,
            is_active,
        } = value;
        Ok(Service {
            service_id,
            name,
            service_type: parse_column("service type", &service_type)?,
            unit_price,
            is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct ServiceAvailabilityRow {
    pub availability_id: ServiceAvailabilityId,
    pub service_id: ServiceId,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub max_capacity: i32,
    pub fixed_time: bool,
    pub is_active: bool,
}

impl TryFrom<ServiceAvailabilityRow> for ServiceAvailability {
    type Error = AppError;

    fn try_from(value: ServiceAvailabilityRow) -> AppResult<Self> {
        let ServiceAvailabilityRow {
            availability_id,
            service_id,
            day_of_week,
            start_time,
            end_time,
            max_capacity,
            fixed_time,
            is_active,
        } = value;
        Ok(ServiceAvailability {
            availability_id,
            service_id,
            day_of_week: weekday_from_index(day_of_week)?,
            start_time,
            end_time,
            max_capacity,
            fixed_time,
            is_active,
        })
    }
}
