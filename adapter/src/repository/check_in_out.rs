use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        check_in_out::{event::CheckOut, CheckInCheckOut, CheckInCheckOutStatus},
        id::CheckInCheckOutId,
    },
    repository::check_in_out::CheckInCheckOutRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::SqliteConnection;

use crate::database::{
    map_commit_error, map_write_error, model::check_in_out::CheckInCheckOutRow, ConnectionPool,
};

#[derive(new)]
pub struct CheckInCheckOutRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl CheckInCheckOutRepository for CheckInCheckOutRepositoryImpl {
    #[tracing::instrument(skip_all, fields(id = %event.check_in_check_out_id), err)]
    async fn check_out(&self, event: CheckOut) -> AppResult<()> {
        let id = event.check_in_check_out_id;
        let mut tx = self.db.begin().await?;

        let record = fetch(&mut tx, id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("check-in/check-out ({id}) was not found"))
        })?;
        record.ensure_can_check_out(event.checked_out_at)?;

        let res = sqlx::query(
            r#"
                UPDATE check_in_check_outs
                SET checked_out_at = ?, status = ?
                WHERE check_in_check_out_id = ? AND status = ?
            "#,
        )
        .bind(event.checked_out_at)
        .bind(CheckInCheckOutStatus::Done.to_string())
        .bind(id)
        .bind(CheckInCheckOutStatus::Pending.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        // another check-out won the race
        if res.rows_affected() < 1 {
            return Err(AppError::AlreadyCheckedOut(format!(
                "check-in/check-out ({id}) was already closed"
            )));
        }

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%id, "room checked out");
        Ok(())
    }

    async fn find_by_id(&self, id: CheckInCheckOutId) -> AppResult<Option<CheckInCheckOut>> {
        let mut conn = super::catalog::acquire(&self.db).await?;
        fetch(&mut conn, id).await
    }
}

async fn fetch(
    conn: &mut SqliteConnection,
    id: CheckInCheckOutId,
) -> AppResult<Option<CheckInCheckOut>> {
    let row: Option<CheckInCheckOutRow> = sqlx::query_as(
        r#"
            SELECT check_in_check_out_id, detail_id, checked_in_at, checked_out_at, status
            FROM check_in_check_outs
            WHERE check_in_check_out_id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_write_error)?;

    row.map(CheckInCheckOut::try_from).transpose()
}
