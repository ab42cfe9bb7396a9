use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use super::{flash, page_layout};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, validation_messages};
use crate::presentation::http::cookies::{SESSION_COOKIE, clear_session, session_cookie};
use crate::presentation::http::middleware::session::Viewer;
use crate::presentation::http::views::{LoginPage, RegisterPage, render};

pub(crate) const DUPLICATE_EMAIL: &str = "The email is already registered. Login instead.";
pub(crate) const UNKNOWN_EMAIL: &str = "The email does not exist in the database.";
pub(crate) const WRONG_PASSWORD: &str = "The password is incorrect!";
pub(crate) const REGISTERED: &str = "Registration complete. Log in to continue.";

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct RegisterForm {
    #[validate(length(min = 1, max = 250, message = "Name must be 1 to 250 characters."))]
    pub(crate) name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub(crate) email: String,
    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters."))]
    pub(crate) password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct LoginForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "Enter your password."))]
    pub(crate) password: String,
}

pub(crate) async fn register_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> AppResult<Response> {
    render_register(&state, jar, &viewer, String::new(), String::new(), Vec::new())
}

pub(crate) async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(mut form): Form<RegisterForm>,
) -> AppResult<Response> {
    form.email = form.email.trim().to_string();
    if let Err(errors) = form.validate() {
        return render_register(
            &state,
            jar,
            &viewer,
            form.name,
            form.email,
            validation_messages(&errors),
        );
    }

    let req = RegisterRequest {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password,
    };

    match state.auth_service.register(req).await {
        Ok(_) => Ok((flash(&state, jar, REGISTERED), Redirect::to("/login")).into_response()),
        Err(DomainError::AlreadyExists(_)) => {
            info!("registration rejected: email already registered");
            Ok((flash(&state, jar, DUPLICATE_EMAIL), Redirect::to("/login")).into_response())
        }
        Err(err @ DomainError::Validation { .. }) => render_register(
            &state,
            jar,
            &viewer,
            form.name,
            form.email,
            vec![err.to_string()],
        ),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn login_page(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> AppResult<Response> {
    render_login(&state, jar, &viewer, String::new(), Vec::new())
}

pub(crate) async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> AppResult<Response> {
    form.email = form.email.trim().to_string();
    if let Err(errors) = form.validate() {
        return render_login(&state, jar, &viewer, form.email, validation_messages(&errors));
    }

    let req = LoginRequest {
        email: form.email.clone(),
        password: form.password,
    };

    match state.auth_service.login(req).await {
        Ok(result) => {
            debug!(
                user_id = result.user.id,
                expires_at = result.expires_at,
                "issuing session cookie"
            );
            if let Some(previous) = jar.get(SESSION_COOKIE) {
                state.auth_service.logout(previous.value()).await?;
            }
            let jar = jar.add(session_cookie(result.session_token, state.cookie_secure));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(DomainError::UnknownEmail) => {
            render_login(&state, jar, &viewer, form.email, vec![UNKNOWN_EMAIL.to_string()])
        }
        Err(DomainError::InvalidCredentials) => {
            render_login(&state, jar, &viewer, form.email, vec![WRONG_PASSWORD.to_string()])
        }
        Err(err @ DomainError::Validation { .. }) => {
            render_login(&state, jar, &viewer, form.email, vec![err.to_string()])
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());
    if let Some(token) = token {
        state.auth_service.logout(&token).await?;
    }
    Ok((clear_session(jar), Redirect::to("/")))
}

fn render_register(
    state: &AppState,
    jar: CookieJar,
    viewer: &Viewer,
    name: String,
    email: String,
    messages: Vec<String>,
) -> AppResult<Response> {
    let (jar, layout) = page_layout(state, jar, viewer, messages);
    let page = RegisterPage {
        layout,
        name,
        email,
    };
    Ok((jar, render(&page)?).into_response())
}

fn render_login(
    state: &AppState,
    jar: CookieJar,
    viewer: &Viewer,
    email: String,
    messages: Vec<String>,
) -> AppResult<Response> {
    let (jar, layout) = page_layout(state, jar, viewer, messages);
    Ok((jar, render(&LoginPage { layout, email })?).into_response())
}
