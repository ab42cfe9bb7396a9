use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::application::auth_service::SessionUser;
use crate::domain::error::DomainError;
use crate::domain::user::Actor;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::cookies::SESSION_COOKIE;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) name: String,
    pub(crate) is_admin: bool,
}

impl AuthenticatedUser {
    pub(crate) fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

impl From<SessionUser> for AuthenticatedUser {
    fn from(session: SessionUser) -> Self {
        Self {
            user_id: session.user.id,
            name: session.user.name,
            is_admin: session.is_admin,
        }
    }
}

/// Whoever is looking at the page, logged in or not.
#[derive(Debug, Clone, Default)]
pub(crate) struct Viewer(pub(crate) Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Session owned by the admin. Anyone else, anonymous included, gets a 403.
#[derive(Debug, Clone)]
pub(crate) struct AdminUser(pub(crate) AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedUser>() {
            Some(user) if user.is_admin => Ok(AdminUser(user.clone())),
            Some(user) => {
                tracing::warn!(
                    user_id = user.user_id,
                    path = %parts.uri.path(),
                    "admin route denied"
                );
                Err(AppError::Domain(DomainError::Forbidden))
            }
            None => {
                tracing::warn!(path = %parts.uri.path(), "admin route denied to anonymous visitor");
                Err(AppError::Domain(DomainError::Forbidden))
            }
        }
    }
}

/// Resolves the `session` cookie into an [`AuthenticatedUser`] request extension.
///
/// Missing, forged, or expired cookies leave the request anonymous.
pub(crate) async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());

    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Some(session) = state.auth_service.resolve_session(cookie.value()).await?
    {
        request
            .extensions_mut()
            .insert(AuthenticatedUser::from(session));
    }

    Ok(next.run(request).await)
}
