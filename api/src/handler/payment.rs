use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    id::PaymentId,
    payment::{event::TransitionPayment, PaymentAction},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::payment::{
    PaymentCreatedResponse, PaymentResponse, RecordPaymentRequest, RecordPaymentRequestAt,
};

pub async fn record_payment(
    State(registry): State<AppRegistry>,
    Json(req): Json<RecordPaymentRequest>,
) -> AppResult<(StatusCode, Json<PaymentCreatedResponse>)> {
    req.validate(&())?;

    let event = RecordPaymentRequestAt::new(Utc::now(), req);
    registry
        .payment_repository()
        .record(event.into())
        .await
        .map(|payment_id| (StatusCode::CREATED, Json(PaymentCreatedResponse { payment_id })))
}

pub async fn show_payment(
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaymentResponse>> {
    registry
        .payment_repository()
        .find_by_id(payment_id)
        .await
        .and_then(|p| match p {
            Some(p) => Ok(Json(p.into())),
            None => Err(AppError::EntityNotFound(format!(
                "payment ({payment_id}) was not found"
            ))),
        })
}

async fn transition(
    registry: AppRegistry,
    payment_id: PaymentId,
    action: PaymentAction,
) -> AppResult<StatusCode> {
    registry
        .payment_repository()
        .transition(TransitionPayment::new(payment_id, action))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn complete_payment(
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    transition(registry, payment_id, PaymentAction::Complete).await
}

pub async fn fail_payment(
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    transition(registry, payment_id, PaymentAction::Fail).await
}

pub async fn refund_payment(
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    transition(registry, payment_id, PaymentAction::Refund).await
}
