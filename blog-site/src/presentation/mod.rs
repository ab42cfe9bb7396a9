use sqlx::SqlitePool;
use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::data::repositories::sqlite::comment_repository::SqliteCommentRepository;
use crate::data::repositories::sqlite::post_repository::SqlitePostRepository;
use crate::data::repositories::sqlite::session_repository::SqliteSessionRepository;
use crate::data::repositories::sqlite::user_repository::SqliteUserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

pub(crate) type SiteAuthService = AuthService<SqliteUserRepository, SqliteSessionRepository>;
pub(crate) type SiteBlogService = BlogService<SqlitePostRepository, SqliteCommentRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: SqlitePool,
    pub(crate) auth_service: Arc<SiteAuthService>,
    pub(crate) blog_service: Arc<SiteBlogService>,
    pub(crate) jwt: Arc<JwtService>,
    pub(crate) cookie_secure: bool,
}

impl AppState {
    pub(crate) fn new(
        pool: SqlitePool,
        auth_service: Arc<SiteAuthService>,
        blog_service: Arc<SiteBlogService>,
        jwt: Arc<JwtService>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            pool,
            auth_service,
            blog_service,
            jwt,
            cookie_secure,
        }
    }

    /// Wires the SQLite repositories and services around one pool.
    pub(crate) fn from_pool(pool: SqlitePool, jwt: JwtService, cookie_secure: bool) -> Self {
        let jwt = Arc::new(jwt);
        let auth_service = Arc::new(AuthService::new(
            SqliteUserRepository::new(pool.clone()),
            SqliteSessionRepository::new(pool.clone()),
            Arc::clone(&jwt),
        ));
        let blog_service = Arc::new(BlogService::new(
            SqlitePostRepository::new(pool.clone()),
            SqliteCommentRepository::new(pool.clone()),
        ));

        Self::new(pool, auth_service, blog_service, jwt, cookie_secure)
    }
}
