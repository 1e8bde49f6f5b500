use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::payment::{
    complete_payment, fail_payment, record_payment, refund_payment, show_payment,
};

pub fn build_payment_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", post(record_payment))
        .route("/:payment_id", get(show_payment))
        .route("/:payment_id/complete", put(complete_payment))
        .route("/:payment_id/fail", put(fail_payment))
        .route("/:payment_id/refund", put(refund_payment));

    Router::new().nest("/payments", routers)
}
