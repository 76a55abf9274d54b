use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{catalog, order, payment};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/countries", get(catalog::countries))
        .route("/services", get(catalog::services))
        .route("/order/quote", post(order::quote))
        .route("/order/commit", post(order::commit))
        .route("/orders", get(order::list_orders))
        .route("/order/{id}", get(order::get_order))
        .route("/order/{id}/cancel", post(order::cancel_order))
        .route("/payment/create", post(payment::create_deposit))
        .route("/payment/status", get(payment::deposit_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "nokos backend up"
}
