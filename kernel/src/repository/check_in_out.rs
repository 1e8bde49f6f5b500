use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    check_in_out::{event::CheckOut, CheckInCheckOut},
    id::CheckInCheckOutId,
};

#[async_trait]
pub trait CheckInCheckOutRepository: Send + Sync {
    /// Closes one occupancy record. The owning reservation is left as is;
    /// completing it is a separate call.
    async fn check_out(&self, event: CheckOut) -> AppResult<()>;
    async fn find_by_id(&self, id: CheckInCheckOutId) -> AppResult<Option<CheckInCheckOut>>;
}
