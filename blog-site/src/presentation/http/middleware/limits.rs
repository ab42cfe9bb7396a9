use std::time::Duration;

use axum::{BoxError, Router, error_handling::HandleErrorLayer, http::StatusCode};
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::error::Elapsed;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::infrastructure::settings::Settings;

pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_overload))
                .timeout(Duration::from_secs(settings.http_request_timeout_secs))
                // shared across every route the router layers this onto
                .layer(GlobalConcurrencyLimitLayer::new(
                    settings.http_concurrency_limit,
                )),
        )
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
}

async fn handle_overload(err: BoxError) -> (StatusCode, &'static str) {
    if err.is::<Elapsed>() {
        warn!("request timed out");
        return (StatusCode::REQUEST_TIMEOUT, "request timed out");
    }
    warn!(error = %err, "request failed in middleware");
    (StatusCode::SERVICE_UNAVAILABLE, "service unavailable")
}
