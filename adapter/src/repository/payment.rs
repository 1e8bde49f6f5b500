use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        id::{PaymentId, ReservationId},
        lifecycle::Lifecycle,
        payment::{
            event::{RecordPayment, TransitionPayment},
            Payment, PaymentStatus,
        },
    },
    repository::payment::PaymentRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::SqliteConnection;

use crate::database::{
    map_commit_error, map_write_error, model::payment::PaymentRow, ConnectionPool,
};

#[derive(new)]
pub struct PaymentRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl PaymentRepository for PaymentRepositoryImpl {
    #[tracing::instrument(skip_all, fields(reservation_id = %event.reservation_id), err)]
    async fn record(&self, event: RecordPayment) -> AppResult<PaymentId> {
        event.validate()?;
        let mut tx = self.db.begin().await?;

        let found: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM reservations WHERE reservation_id = ?")
                .bind(event.reservation_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_write_error)?;
        if found != Some(true) {
            return Err(AppError::EntityNotFound(format!(
                "reservation ({}) was not found",
                event.reservation_id
            )));
        }

        let payment_id = PaymentId::new();
        sqlx::query(
            r#"
                INSERT INTO payments
                (payment_id, reservation_id, amount, method, status, paid_at)
                VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment_id)
        .bind(event.reservation_id)
        .bind(event.amount)
        .bind(event.method.to_string())
        .bind(PaymentStatus::Pending.to_string())
        .bind(event.paid_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%payment_id, amount = event.amount, "payment recorded");
        Ok(payment_id)
    }

    #[tracing::instrument(skip_all, fields(payment_id = %event.payment_id, action = %event.action), err)]
    async fn transition(&self, event: TransitionPayment) -> AppResult<()> {
        let payment_id = event.payment_id;
        let mut tx = self.db.begin().await?;

        let payment = fetch(&mut tx, payment_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!("payment ({payment_id}) was not found"))
        })?;
        let from = payment.status;
        let to = from.apply(event.action)?;

        let res = sqlx::query("UPDATE payments SET status = ? WHERE payment_id = ? AND status = ?")
            .bind(to.to_string())
            .bind(payment_id)
            .bind(from.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        if res.rows_affected() < 1 {
            return Err(AppError::Conflict(format!(
                "payment ({payment_id}) changed while moving from {from} to {to}"
            )));
        }

        tx.commit().await.map_err(map_commit_error)?;
        Ok(())
    }

    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Option<Payment>> {
        let mut conn = super::catalog::acquire(&self.db).await?;
        fetch(&mut conn, payment_id).await
    }

    async fn find_by_reservation(&self, reservation_id: ReservationId) -> AppResult<Vec<Payment>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
                SELECT payment_id, reservation_id, amount, method, status, paid_at
                FROM payments
                WHERE reservation_id = ?
                ORDER BY paid_at ASC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}

async fn fetch(conn: &mut SqliteConnection, payment_id: PaymentId) -> AppResult<Option<Payment>> {
    let row: Option<PaymentRow> = sqlx::query_as(
        r#"
            SELECT payment_id, reservation_id, amount, method, status, paid_at
            FROM payments
            WHERE payment_id = ?
        "#,
    )
    .bind(payment_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_write_error)?;

    row.map(Payment::try_from).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reservation::tests::{june, Hotel};
    use kernel::model::payment::{PaymentAction, PaymentMethod};

    #[tokio::test]
    async fn test_payment_ledger() -> anyhow::Result<()> {
        let hotel = Hotel::open().await;
        let room = hotel.room("101").await;
        let reservation_id = hotel.book(&[room], 1, 5).await?;
        let repo = PaymentRepositoryImpl::new(hotel.db.clone());

        let payment_id = repo
            .record(RecordPayment::new(reservation_id, 48_000, PaymentMethod::Card, june(1)))
            .await?;
        let payment = repo.find_by_id(payment_id).await?.unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount, 48_000);

        let refund_early = repo
            .transition(TransitionPayment::new(payment_id, PaymentAction::Refund))
            .await;
        assert!(matches!(refund_early, Err(AppError::InvalidTransition(_))));

        repo.transition(TransitionPayment::new(payment_id, PaymentAction::Complete))
            .await?;
        repo.transition(TransitionPayment::new(payment_id, PaymentAction::Refund))
            .await?;

        let ledger = repo.find_by_reservation(reservation_id).await?;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].status, PaymentStatus::Refunded);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_payments_are_rejected() {
        let hotel = Hotel::open().await;
        let repo = PaymentRepositoryImpl::new(hotel.db.clone());

        let unknown = repo
            .record(RecordPayment::new(ReservationId::new(), 100, PaymentMethod::Cash, june(1)))
            .await;
        assert!(matches!(unknown, Err(AppError::EntityNotFound(_))));

        let zero = repo
            .record(RecordPayment::new(ReservationId::new(), 0, PaymentMethod::Cash, june(1)))
            .await;
        assert!(matches!(zero, Err(AppError::UnprocessableEntity(_))));
    }
}
