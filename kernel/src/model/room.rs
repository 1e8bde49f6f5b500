use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::id::RoomId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: RoomId,
    pub room_number: String,
    pub capacity: i32,
    pub category: RoomCategory,
    pub status: RoomStatus,
    pub is_active: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomCategory {
    Single,
    Double,
    Suite,
    Family,
}

impl RoomCategory {
    /// Nightly rate in minor currency units.
    pub fn base_price(self) -> i64 {
        match self {
            RoomCategory::Single => 8_000,
            RoomCategory::Double => 12_000,
            RoomCategory::Family => 18_000,
            RoomCategory::Suite => 25_000,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
}

#[derive(Debug, Clone, new)]
pub struct RegisterRoom {
    pub room_number: String,
    pub capacity: i32,
    pub category: RoomCategory,
}
