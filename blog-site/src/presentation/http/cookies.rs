use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::error;

use crate::infrastructure::jwt::JwtService;

pub(crate) const SESSION_COOKIE: &str = "session";
pub(crate) const FLASH_COOKIE: &str = "flash";

pub(crate) fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub(crate) fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Queues messages for the next rendered page.
///
/// Flash delivery is best effort: a signing failure is logged and the
/// messages are dropped rather than failing the request.
pub(crate) fn push_flash(
    jar: CookieJar,
    jwt: &JwtService,
    secure: bool,
    messages: Vec<String>,
) -> CookieJar {
    if messages.is_empty() {
        return jar;
    }
    match jwt.generate_flash_token(messages) {
        Ok(token) => jar.add(
            Cookie::build((FLASH_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(secure),
        ),
        Err(err) => {
            error!(error = %err, "failed to sign flash cookie");
            jar
        }
    }
}

/// Pops pending flash messages. The cookie is cleared whether or not it verified.
pub(crate) fn take_flash(jar: CookieJar, jwt: &JwtService) -> (CookieJar, Vec<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, Vec::new());
    };
    let messages = jwt
        .verify_flash_token(cookie.value())
        .map(|claims| claims.messages)
        .unwrap_or_default();

    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}
