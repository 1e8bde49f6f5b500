use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::{
    model::{
        contract::{
            event::{
                AttachPayment, CreateServiceContract, SlotCapacityQuery,
                TransitionServiceContract,
            },
            ContractStatus, ServiceContract,
        },
        id::{ReservationId, ServiceAvailabilityId, ServiceContractId, ServiceId},
        lifecycle::Lifecycle,
        service::{slot::ServiceAvailability, Service},
    },
    repository::contract::ServiceContractRepository,
};
use shared::error::{AppError, AppResult};
use sqlx::SqliteConnection;

use super::catalog::{
    acquire, ensure_active_client, fetch_service, fetch_service_availability,
};
use crate::{
    database::{
        map_commit_error, map_write_error, model::contract::ServiceContractRow, ConnectionPool,
    },
    lock::{LockTable, SlotKey},
};

#[derive(new)]
pub struct ServiceContractRepositoryImpl {
    db: ConnectionPool,
    slot_locks: Arc<LockTable<SlotKey>>,
}

#[async_trait]
impl ServiceContractRepository for ServiceContractRepositoryImpl {
    #[tracing::instrument(
        skip_all,
        fields(service_id = %event.service_id, service_date = %event.service_date),
        err
    )]
    async fn contract(&self, event: CreateServiceContract) -> AppResult<ServiceContractId> {
        event.validate()?;

        let key = SlotKey {
            service_id: event.service_id,
            service_date: event.service_date,
        };
        let _lock = self.slot_locks.acquire(key).await?;
        let mut tx = self.db.begin().await?;

        ensure_active_client(&mut tx, event.client_id).await?;
        if let Some(reservation_id) = event.reservation_id {
            ensure_reservation_exists(&mut tx, reservation_id).await?;
        }
        let (service, slot) = resolve_slot(
            &mut tx,
            event.service_id,
            event.availability_id,
            event.service_date,
        )
        .await?;

        lock_slot(&mut tx, &key).await?;
        let booked = consumed_quantity(&mut tx, &key).await?;
        let remaining = slot.remaining_capacity(booked);
        if remaining < event.quantity {
            tracing::warn!(remaining, requested = event.quantity, "slot is full");
            return Err(AppError::CapacityExceeded(format!(
                "{key} has {remaining} place(s) left, {} requested",
                event.quantity
            )));
        }

        let contract_id = ServiceContractId::new();
        sqlx::query(
            r#"
                INSERT INTO service_contracts
                (contract_id, service_id, availability_id, reservation_id, client_id,
                payment_id, contracted_at, service_date, quantity, unit_price, status,
                observations, is_active)
                VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(contract_id)
        .bind(service.service_id)
        .bind(slot.availability_id)
        .bind(event.reservation_id)
        .bind(event.client_id)
        .bind(event.contracted_at)
        .bind(event.service_date)
        .bind(event.quantity)
        .bind(service.unit_price)
        .bind(ContractStatus::Pending.to_string())
        .bind(&event.observations)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%contract_id, quantity = event.quantity, "service contracted");
        Ok(contract_id)
    }

    #[tracing::instrument(skip_all, fields(contract_id = %event.contract_id, action = %event.action), err)]
    async fn transition(&self, event: TransitionServiceContract) -> AppResult<()> {
        let contract_id = event.contract_id;
        let mut tx = self.db.begin().await?;

        let contract = fetch_contract(&mut tx, contract_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| contract_not_found(contract_id))?;
        let from = contract.status;
        let to = from.apply(event.action)?;

        let res = sqlx::query(
            r#"
                UPDATE service_contracts
                SET status = ?
                WHERE contract_id = ? AND status = ?
            "#,
        )
        .bind(to.to_string())
        .bind(contract_id)
        .bind(from.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::Conflict(format!(
                "service contract ({contract_id}) changed while moving from {from} to {to}"
            )));
        }

        tx.commit().await.map_err(map_commit_error)?;

        tracing::info!(%contract_id, %from, %to, "service contract updated");
        Ok(())
    }

    async fn attach_payment(&self, event: AttachPayment) -> AppResult<()> {
        let AttachPayment {
            contract_id,
            payment_id,
        } = event;
        let mut tx = self.db.begin().await?;

        let contract = fetch_contract(&mut tx, contract_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| contract_not_found(contract_id))?;
        let paid_for: Option<ReservationId> =
            sqlx::query_scalar("SELECT reservation_id FROM payments WHERE payment_id = ?")
                .bind(payment_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_write_error)?;
        let paid_for = paid_for.ok_or_else(|| {
            AppError::EntityNotFound(format!("payment ({payment_id}) was not found"))
        })?;

        if contract.reservation_id.is_some_and(|id| id != paid_for) {
            return Err(AppError::UnprocessableEntity(format!(
                "payment ({payment_id}) belongs to another reservation than contract ({contract_id})"
            )));
        }

        sqlx::query("UPDATE service_contracts SET payment_id = ? WHERE contract_id = ?")
            .bind(payment_id)
            .bind(contract_id)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await.map_err(map_commit_error)?;
        Ok(())
    }

    async fn remaining_capacity(&self, query: SlotCapacityQuery) -> AppResult<i32> {
        let mut conn = acquire(&self.db).await?;
        let (_, slot) = resolve_slot(
            &mut conn,
            query.service_id,
            query.availability_id,
            query.on_date,
        )
        .await?;
        let key = SlotKey {
            service_id: query.service_id,
            service_date: query.on_date,
        };
        let booked = consumed_quantity(&mut conn, &key).await?;
        Ok(slot.remaining_capacity(booked))
    }

    async fn find_by_id(
        &self,
        contract_id: ServiceContractId,
    ) -> AppResult<Option<ServiceContract>> {
        let mut conn = acquire(&self.db).await?;
        fetch_contract(&mut conn, contract_id).await
    }

    async fn find_by_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ServiceContract>> {
        let rows: Vec<ServiceContractRow> = sqlx::query_as(
            r#"
                SELECT contract_id, service_id, availability_id, reservation_id, client_id,
                payment_id, contracted_at, service_date, quantity, unit_price, status,
                observations, is_active
                FROM service_contracts
                WHERE reservation_id = ?
                ORDER BY contracted_at ASC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(ServiceContract::try_from).collect()
    }
}

fn contract_not_found(contract_id: ServiceContractId) -> AppError {
    AppError::EntityNotFound(format!("service contract ({contract_id}) was not found"))
}

/// Active service plus an active template that runs on `on_date`.
async fn resolve_slot(
    conn: &mut SqliteConnection,
    service_id: ServiceId,
    availability_id: ServiceAvailabilityId,
    on_date: NaiveDate,
) -> AppResult<(Service, ServiceAvailability)> {
    let service = fetch_service(conn, service_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| AppError::EntityNotFound(format!("service ({service_id}) was not found")))?;
    let slot = fetch_service_availability(conn, availability_id)
        .await?
        .filter(|a| a.is_active)
        .ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "service availability ({availability_id}) was not found"
            ))
        })?;
    slot.ensure_serves(service_id, on_date)?;
    Ok((service, slot))
}

async fn ensure_reservation_exists(
    conn: &mut SqliteConnection,
    reservation_id: ReservationId,
) -> AppResult<()> {
    let found: Option<bool> =
        sqlx::query_scalar("SELECT is_active FROM reservations WHERE reservation_id = ?")
            .bind(reservation_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_write_error)?;
    match found {
        Some(true) => Ok(()),
        _ => Err(AppError::EntityNotFound(format!(
            "reservation ({reservation_id}) was not found"
        ))),
    }
}

// Write lock on the (service, date) slot before its capacity is counted.
async fn lock_slot(conn: &mut SqliteConnection, key: &SlotKey) -> AppResult<()> {
    sqlx::query(
        r#"
            INSERT INTO service_slot_locks (service_id, service_date, lock_version)
            VALUES (?, ?, 1)
            ON CONFLICT (service_id, service_date)
            DO UPDATE SET lock_version = lock_version + 1
        "#,
    )
    .bind(key.service_id)
    .bind(key.service_date)
    .execute(&mut *conn)
    .await
    .map_err(map_write_error)?;
    Ok(())
}

async fn consumed_quantity(conn: &mut SqliteConnection, key: &SlotKey) -> AppResult<i64> {
    let [pending, confirmed, completed] = ContractStatus::CONSUMING.map(|s| s.to_string());
    sqlx::query_scalar(
        r#"
            SELECT COALESCE(SUM(quantity), 0)
            FROM service_contracts
            WHERE service_id = ?
              AND service_date = ?
              AND is_active = 1
              AND status IN (?, ?, ?)
        "#,
    )
    .bind(key.service_id)
    .bind(key.service_date)
    .bind(pending)
    .bind(confirmed)
    .bind(completed)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_write_error)
}

async fn fetch_contract(
    conn: &mut SqliteConnection,
    contract_id: ServiceContractId,
) -> AppResult<Option<ServiceContract>> {
    let row: Option<ServiceContractRow> = sqlx::query_as(
        r#"
            SELECT contract_id, service_id, availability_id, reservation_id, client_id,
            payment_id, contracted_at, service_date, quantity, unit_price, status,
            observations, is_active
            FROM service_contracts
            WHERE contract_id = ?
        "#,
    )
    .bind(contract_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_write_error)?;

    row.map(ServiceContract::try_from).transpose()
}
