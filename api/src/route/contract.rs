use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::contract::{
    attach_payment, cancel_service_contract, check_service_capacity, complete_service_contract,
    confirm_service_contract, contract_service, show_service_contract,
};

pub fn build_service_contract_routers() -> Router<AppRegistry> {
    let contract_routers = Router::new()
        .route("/", post(contract_service))
        .route("/:contract_id", get(show_service_contract))
        .route("/:contract_id/confirm", put(confirm_service_contract))
        .route("/:contract_id/complete", put(complete_service_contract))
        .route("/:contract_id/cancel", put(cancel_service_contract))
        .route("/:contract_id/payment", put(attach_payment));

    Router::new()
        .nest("/service-contracts", contract_routers)
        .route("/services/:service_id/capacity", get(check_service_capacity))
}
