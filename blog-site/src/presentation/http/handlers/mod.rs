use axum_extra::extract::cookie::CookieJar;

use crate::presentation::AppState;
use crate::presentation::http::cookies::{push_flash, take_flash};
use crate::presentation::http::middleware::session::Viewer;
use crate::presentation::http::views::Layout;

pub(crate) mod auth;
pub(crate) mod pages;
pub(crate) mod posts;

/// Builds the shared page layout, draining pending flash messages and
/// appending `extra` ones produced by the current request.
pub(crate) fn page_layout(
    state: &AppState,
    jar: CookieJar,
    viewer: &Viewer,
    extra: Vec<String>,
) -> (CookieJar, Layout) {
    let (jar, mut messages) = take_flash(jar, &state.jwt);
    messages.extend(extra);
    (jar, Layout::new(viewer, messages))
}

pub(crate) fn flash(state: &AppState, jar: CookieJar, message: impl Into<String>) -> CookieJar {
    push_messages(state, jar, vec![message.into()])
}

pub(crate) fn push_messages(state: &AppState, jar: CookieJar, messages: Vec<String>) -> CookieJar {
    push_flash(jar, &state.jwt, state.cookie_secure, messages)
}
