use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::id::ServiceId;

pub mod event;
pub mod slot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub service_id: ServiceId,
    pub name: String,
    pub service_type: ServiceType,
    /// Price per unit in minor currency units.
    pub unit_price: i64,
    pub is_active: bool,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Free,
    Paid,
}
