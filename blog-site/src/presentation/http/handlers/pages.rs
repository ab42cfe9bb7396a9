use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::error;

use super::page_layout;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::session::Viewer;
use crate::presentation::http::views::{AboutPage, ContactPage, render};

pub(crate) async fn about(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, layout) = page_layout(&state, jar, &viewer, Vec::new());
    Ok((jar, render(&AboutPage { layout })?).into_response())
}

pub(crate) async fn contact(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, layout) = page_layout(&state, jar, &viewer, Vec::new());
    Ok((jar, render(&ContactPage { layout })?).into_response())
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthzResponse {
    status: &'static str,
    database: &'static str,
}

pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthzResponse>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthzResponse {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(err) => {
            error!(error = %err, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthzResponse {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}
