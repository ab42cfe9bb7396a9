use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};
use chrono::Utc;
use tracing::{debug, info};

use crate::data::session_repository::{NewSession, SessionRepository};
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;

const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub(crate) struct LoginResult {
    pub(crate) user: User,
    pub(crate) session_token: String,
    pub(crate) expires_at: i64,
}

/// User behind a valid session cookie.
#[derive(Debug, Clone)]
pub(crate) struct SessionUser {
    pub(crate) user: User,
    pub(crate) is_admin: bool,
}

pub(crate) struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    jwt: Arc<JwtService>,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub(crate) fn new(users: U, sessions: S, jwt: Arc<JwtService>) -> Self {
        Self {
            users,
            sessions,
            jwt,
        }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let password_hash = self.hash_password(&req.password)?;
        let user = self
            .users
            .create_user(Self::into_new_user(req, password_hash))
            .await?;

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<LoginResult, DomainError> {
        let req = req.validate()?;

        let user_creds = self
            .users
            .find_by_email(&req.email)
            .await?
            .ok_or(DomainError::UnknownEmail)?;

        self.verify_password(&req.password, &user_creds.password_hash)?;

        let now = Utc::now().timestamp();
        let purged = self.sessions.delete_expired(now).await?;
        if purged > 0 {
            debug!(purged, "expired sessions removed");
        }

        let expires_at = self.jwt.session_expiry();
        let session = self
            .sessions
            .create_session(NewSession {
                id: new_session_id(),
                user_id: user_creds.user.id,
                created_at: now,
                expires_at,
            })
            .await?;

        let session_token = self
            .jwt
            .generate_session_token(&session.id, session.expires_at)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        info!(user_id = user_creds.user.id, "user logged in");
        Ok(LoginResult {
            user: user_creds.user,
            session_token,
            expires_at,
        })
    }

    /// Ends the session behind `token`. Tokens that no longer verify are ignored.
    pub(crate) async fn logout(&self, token: &str) -> Result<(), DomainError> {
        let Ok(claims) = self.jwt.verify_session_token(token) else {
            return Ok(());
        };
        if self.sessions.delete_session(&claims.sid).await? {
            info!("session ended");
        }
        Ok(())
    }

    pub(crate) async fn resolve_session(
        &self,
        token: &str,
    ) -> Result<Option<SessionUser>, DomainError> {
        let Ok(claims) = self.jwt.verify_session_token(token) else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        let Some(session) = self.sessions.find_active(&claims.sid, now).await? else {
            return Ok(None);
        };
        let Some(user) = self.users.find_by_id(session.user_id).await? else {
            return Ok(None);
        };

        let is_admin = self.is_admin(user.id).await?;
        Ok(Some(SessionUser { user, is_admin }))
    }

    /// The admin is whoever owns the first account ever created.
    pub(crate) async fn is_admin(&self, user_id: i64) -> Result<bool, DomainError> {
        Ok(self.users.first_user_id().await? == Some(user_id))
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    pub(crate) fn into_new_user(req: RegisterRequest, password_hash: String) -> NewUser {
        NewUser {
            name: req.name,
            email: req.email,
            password_hash,
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

fn new_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
