use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of a check-out; the server clock is used when `checkedOutAt` is absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    pub checked_out_at: Option<DateTime<Utc>>,
}
