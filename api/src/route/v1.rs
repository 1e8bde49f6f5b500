use axum::Router;
use registry::AppRegistry;

use super::{
    check_in_out::build_check_in_out_routers, contract::build_service_contract_routers,
    health::build_health_check_routers, payment::build_payment_routers,
    reservation::build_reservation_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_reservation_routers())
        .merge(build_check_in_out_routers())
        .merge(build_service_contract_routers())
        .merge(build_payment_routers());
    Router::new().nest("/api/v1", router)
}
