use chrono::{DateTime, Utc};
use derive_new::new;

use crate::model::id::CheckInCheckOutId;

#[derive(Debug, Clone, Copy, new)]
pub struct CheckOut {
    pub check_in_check_out_id: CheckInCheckOutId,
    pub checked_out_at: DateTime<Utc>,
}
