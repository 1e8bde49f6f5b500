use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    contract::{
        event::{AttachPayment, SlotCapacityQuery, TransitionServiceContract},
        ContractAction,
    },
    id::{ServiceContractId, ServiceId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::contract::{
    AttachPaymentRequest, CapacityQuery, CapacityResponse, CreateServiceContractRequest,
    CreateServiceContractRequestAt, ServiceContractCreatedResponse, ServiceContractResponse,
};

pub async fn contract_service(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateServiceContractRequest>,
) -> AppResult<(StatusCode, Json<ServiceContractCreatedResponse>)> {
    req.validate(&())?;

    let event = CreateServiceContractRequestAt::new(Utc::now(), req);
    registry
        .service_contract_repository()
        .contract(event.into())
        .await
        .map(|contract_id| {
            (
                StatusCode::CREATED,
                Json(ServiceContractCreatedResponse { contract_id }),
            )
        })
}

pub async fn show_service_contract(
    Path(contract_id): Path<ServiceContractId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ServiceContractResponse>> {
    registry
        .service_contract_repository()
        .find_by_id(contract_id)
        .await
        .and_then(|c| match c {
            Some(c) => ServiceContractResponse::try_from(c).map(Json),
            None => Err(AppError::EntityNotFound(format!(
                "service contract ({contract_id}) was not found"
            ))),
        })
}

async fn transition(
    registry: AppRegistry,
    contract_id: ServiceContractId,
    action: ContractAction,
) -> AppResult<StatusCode> {
    registry
        .service_contract_repository()
        .transition(TransitionServiceContract::new(contract_id, action))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn confirm_service_contract(
    Path(contract_id): Path<ServiceContractId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    transition(registry, contract_id, ContractAction::Confirm).await
}

pub async fn complete_service_contract(
    Path(contract_id): Path<ServiceContractId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    transition(registry, contract_id, ContractAction::Complete).await
}

pub async fn cancel_service_contract(
    Path(contract_id): Path<ServiceContractId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    transition(registry, contract_id, ContractAction::Cancel).await
}

pub async fn attach_payment(
    Path(contract_id): Path<ServiceContractId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<AttachPaymentRequest>,
) -> AppResult<StatusCode> {
    registry
        .service_contract_repository()
        .attach_payment(AttachPayment::new(contract_id, req.payment_id))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn check_service_capacity(
    Path(service_id): Path<ServiceId>,
    Query(query): Query<CapacityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CapacityResponse>> {
    let CapacityQuery {
        availability_id,
        date,
    } = query;
    registry
        .service_contract_repository()
        .remaining_capacity(SlotCapacityQuery::new(service_id, availability_id, date))
        .await
        .map(|remaining| {
            Json(CapacityResponse {
                service_id,
                availability_id,
                date,
                remaining,
            })
        })
}
