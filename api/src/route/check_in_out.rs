use axum::{routing::put, Router};
use registry::AppRegistry;

use crate::handler::check_in_out::check_out;

pub fn build_check_in_out_routers() -> Router<AppRegistry> {
    Router::new().route("/check-in-check-outs/:id/check-out", put(check_out))
}
