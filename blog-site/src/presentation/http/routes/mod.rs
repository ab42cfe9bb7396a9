use axum::Router;
use axum::middleware;

use crate::presentation::AppState;
use crate::presentation::http::middleware::session::session_middleware;

pub(crate) mod auth;
pub(crate) mod pages;
pub(crate) mod posts;

/// Every HTML route. The session layer runs for all of them so that
/// pages can render the viewer and admin routes can reject everyone else.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(pages::router())
        .layer(middleware::from_fn_with_state(state, session_middleware))
}
