use axum::{Router, routing::get};

use super::AppState;

pub(crate) mod app_error;
pub(crate) mod cookies;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod routes;
pub(crate) mod views;

pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::pages::healthz))
        .merge(routes::router(state.clone()))
        .with_state(state)
}
