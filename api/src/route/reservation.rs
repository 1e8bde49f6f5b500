use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{
    cancel_reservation, check_in, check_room_availability, complete_reservation,
    confirm_reservation, create_reservation, show_check_in_check_outs, show_reservation,
};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservation_routers = Router::new()
        .route("/", post(create_reservation))
        .route("/:reservation_id", get(show_reservation))
        .route("/:reservation_id/confirm", put(confirm_reservation))
        .route("/:reservation_id/check-in", put(check_in))
        .route("/:reservation_id/complete", put(complete_reservation))
        .route("/:reservation_id/cancel", put(cancel_reservation))
        .route(
            "/:reservation_id/check-in-check-outs",
            get(show_check_in_check_outs),
        );

    Router::new()
        .nest("/reservations", reservation_routers)
        .route("/rooms/:room_id/availability", get(check_room_availability))
}
