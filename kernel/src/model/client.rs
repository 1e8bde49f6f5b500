use chrono::NaiveDate;
use derive_new::new;

use crate::model::id::ClientId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
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

#[derive(Debug, Clone, new)]
pub struct RegisterClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub identification_type: String,
    pub identification_number: String,
    pub external_identity_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
}
