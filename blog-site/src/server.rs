use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::infrastructure::settings::Settings;
use crate::presentation::http::middleware::limits::apply_limits;
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::{AppState, http};

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let app = apply_limits(app, settings);
    let app = apply_trace(app);

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    http::routes(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use super::build_router;
    use crate::infrastructure::database::test_pool;
    use crate::infrastructure::jwt::JwtService;
    use crate::presentation::AppState;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const POST_FORM: &str = concat!(
        "title=First+Post&subtitle=Hello",
        "&img_url=https%3A%2F%2Fexample.com%2Fa.png&body=%3Cp%3EHi%3C%2Fp%3E",
    );
    const RENAMED_FORM: &str = concat!(
        "title=Renamed&subtitle=Hello+again",
        "&img_url=https%3A%2F%2Fexample.com%2Fb.png&body=%3Cp%3EEdited%3C%2Fp%3E",
    );

    struct Reply {
        status: StatusCode,
        location: Option<String>,
        body: String,
    }

    /// One browser: keeps whatever cookies the site sets.
    struct Browser {
        app: Router,
        cookies: HashMap<String, String>,
    }

    impl Browser {
        fn new(app: &Router) -> Self {
            Self {
                app: app.clone(),
                cookies: HashMap::new(),
            }
        }

        async fn get(&mut self, uri: &str) -> Reply {
            self.send("GET", uri, None).await
        }

        async fn post(&mut self, uri: &str, form: &str) -> Reply {
            self.send("POST", uri, Some(form)).await
        }

        async fn send(&mut self, method: &str, uri: &str, form: Option<&str>) -> Reply {
            let mut builder = Request::builder().method(method).uri(uri);
            if !self.cookies.is_empty() {
                let cookie = self
                    .cookies
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                builder = builder.header(header::COOKIE, cookie);
            }
            let body = match form {
                Some(form) => {
                    builder = builder.header(
                        header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    );
                    Body::from(form.to_string())
                }
                None => Body::empty(),
            };
            let request = builder.body(body).expect("request must build");

            let response = self
                .app
                .clone()
                .oneshot(request)
                .await
                .expect("router is infallible");

            for set_cookie in response.headers().get_all(header::SET_COOKIE) {
                let raw = set_cookie.to_str().expect("set-cookie must be ascii");
                let pair = raw.split(';').next().unwrap_or_default();
                let Some((name, value)) = pair.split_once('=') else {
                    continue;
                };
                if value.is_empty() {
                    self.cookies.remove(name);
                } else {
                    self.cookies.insert(name.to_string(), value.to_string());
                }
            }

            let status = response.status();
            let location = response
                .headers()
                .get(header::LOCATION)
                .map(|value| value.to_str().expect("location must be ascii").to_string());
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body must be readable");

            Reply {
                status,
                location,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }
        }

        fn has_session(&self) -> bool {
            self.cookies.contains_key("session")
        }
    }

    async fn app() -> (Router, SqlitePool) {
        let pool = test_pool().await;
        let state = AppState::from_pool(pool.clone(), JwtService::new(SECRET, 3600), false);
        (build_router(state), pool)
    }

    async fn signed_in(app: &Router, name: &str, email: &str) -> Browser {
        let mut browser = Browser::new(app);
        let reply = browser
            .post(
                "/register",
                &format!("name={name}&email={email}&password=pw1"),
            )
            .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        let reply = browser
            .post("/login", &format!("email={email}&password=pw1"))
            .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert!(browser.has_session());
        browser
    }

    async fn only_post_id(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT id FROM posts")
            .fetch_one(pool)
            .await
            .expect("one post must exist")
    }

    async fn stored_title(pool: &SqlitePool, id: i64) -> String {
        sqlx::query_scalar::<_, String>("SELECT title FROM posts WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .expect("post must exist")
    }

    async fn comment_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
            .fetch_one(pool)
            .await
            .expect("count must succeed")
    }

    #[tokio::test]
    async fn register_then_login_starts_a_session() {
        let (app, _pool) = app().await;
        let mut browser = Browser::new(&app);

        let reply = browser
            .post("/register", "name=Alice&email=a%40x.com&password=pw1")
            .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/login"));
        assert!(!browser.has_session());

        let reply = browser.post("/login", "email=a%40x.com&password=pw1").await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location.as_deref(), Some("/"));
        assert!(browser.has_session());

        let reply = browser.get("/").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("Alice"));
        assert!(reply.body.contains("Log Out"));
    }

    #[tokio::test]
    async fn wrong_password_shows_message_and_no_session() {
        let (app, _pool) = app().await;
        let mut browser = Browser::new(&app);
        browser
            .post("/register", "name=Alice&email=a%40x.com&password=pw1")
            .await;

        let reply = browser.post("/login", "email=a%40x.com&password=wrong").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("The password is incorrect!"));
        assert!(!browser.has_session());

        let reply = browser.post("/login", "email=b%40x.com&password=pw1").await;
        assert!(reply.body.contains("The email does not exist in the database."));
        assert!(!browser.has_session());
    }

    #[tokio::test]
    async fn duplicate_email_keeps_single_account() {
        let (app, pool) = app().await;
        let mut browser = Browser::new(&app);
        browser
            .post("/register", "name=Alice&email=a%40x.com&password=pw1")
            .await;

        let reply = browser
            .post("/register", "name=Other&email=A%40X.com&password=pw2")
            .await;
        assert_eq!(reply.location.as_deref(), Some("/login"));

        let reply = browser.get("/login").await;
        assert!(reply.body.contains("The email is already registered. Login instead."));

        let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("count must succeed");
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn only_the_first_user_may_manage_posts() {
        let (app, pool) = app().await;
        let mut admin = signed_in(&app, "Alice", "a%40x.com").await;
        let mut other = signed_in(&app, "Bob", "b%40x.com").await;
        let mut anonymous = Browser::new(&app);

        let reply = admin.post("/new-post", POST_FORM).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        let id = only_post_id(&pool).await;

        for browser in [&mut other, &mut anonymous] {
            assert_eq!(browser.get("/new-post").await.status, StatusCode::FORBIDDEN);
            assert_eq!(
                browser.post("/new-post", POST_FORM).await.status,
                StatusCode::FORBIDDEN
            );
            assert_eq!(
                browser.get(&format!("/edit-post/{id}")).await.status,
                StatusCode::FORBIDDEN
            );
            assert_eq!(
                browser
                    .post(&format!("/edit-post/{id}"), RENAMED_FORM)
                    .await
                    .status,
                StatusCode::FORBIDDEN
            );
            assert_eq!(
                browser.get(&format!("/delete/{id}")).await.status,
                StatusCode::FORBIDDEN
            );
        }
        assert_eq!(stored_title(&pool, id).await, "First Post");

        let reply = admin.get(&format!("/edit-post/{id}")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("First Post"));

        let posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .expect("count must succeed");
        assert_eq!(posts, 1);
    }

    #[tokio::test]
    async fn admin_edit_updates_the_stored_post() {
        let (app, pool) = app().await;
        let mut admin = signed_in(&app, "Alice", "a%40x.com").await;
        admin.post("/new-post", POST_FORM).await;
        let id = only_post_id(&pool).await;

        let reply = admin.post(&format!("/edit-post/{id}"), RENAMED_FORM).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        let back = format!("/post/{id}");
        assert_eq!(reply.location.as_deref(), Some(back.as_str()));
        assert_eq!(stored_title(&pool, id).await, "Renamed");

        let reply = admin.get(&back).await;
        assert!(reply.body.contains("Renamed"));
        assert!(reply.body.contains("<p>Edited</p>"));
    }

    #[tokio::test]
    async fn admin_routes_return_not_found_for_missing_post() {
        let (app, _pool) = app().await;
        let mut admin = signed_in(&app, "Alice", "a%40x.com").await;

        assert_eq!(admin.get("/edit-post/999").await.status, StatusCode::NOT_FOUND);
        assert_eq!(
            admin.post("/edit-post/999", RENAMED_FORM).await.status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(admin.get("/delete/999").await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_title_is_reported_on_the_form() {
        let (app, pool) = app().await;
        let mut admin = signed_in(&app, "Alice", "a%40x.com").await;
        admin.post("/new-post", POST_FORM).await;

        let reply = admin.post("/new-post", POST_FORM).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("A post with this title already exists."));
        assert!(reply.body.contains("First Post"));

        let posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .expect("count must succeed");
        assert_eq!(posts, 1);
    }

    #[tokio::test]
    async fn padded_email_is_trimmed_and_lowercased() {
        let (app, pool) = app().await;
        let mut browser = Browser::new(&app);

        let reply = browser
            .post("/register", "name=Alice&email=+A%40X.com+&password=pw1")
            .await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        let stored = sqlx::query_scalar::<_, String>("SELECT email FROM users")
            .fetch_one(&pool)
            .await
            .expect("user must exist");
        assert_eq!(stored, "a@x.com");

        let reply = browser.post("/login", "email=+A%40X.com+&password=pw1").await;
        assert_eq!(reply.location.as_deref(), Some("/"));
        assert!(browser.has_session());
    }

    #[tokio::test]
    async fn comments_require_a_session() {
        let (app, pool) = app().await;
        let mut admin = signed_in(&app, "Alice", "a%40x.com").await;
        let mut reader = signed_in(&app, "Bob", "b%40x.com").await;
        admin.post("/new-post", POST_FORM).await;
        let id = only_post_id(&pool).await;

        let mut anonymous = Browser::new(&app);
        let reply = anonymous
            .post(&format!("/post/{id}"), "text=drive-by")
            .await;
        assert_eq!(reply.location.as_deref(), Some("/login"));
        assert_eq!(comment_count(&pool).await, 0);
        let reply = anonymous.get("/login").await;
        assert!(reply.body.contains("You need to login or register to comment."));

        let reply = reader.post(&format!("/post/{id}"), "text=Nice+post").await;
        let back = format!("/post/{id}");
        assert_eq!(reply.location.as_deref(), Some(back.as_str()));

        let (author_id, post_id) =
            sqlx::query_as::<_, (i64, i64)>("SELECT author_id, post_id FROM comments")
                .fetch_one(&pool)
                .await
                .expect("one comment must exist");
        let bob_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE name = 'Bob'")
            .fetch_one(&pool)
            .await
            .expect("bob must exist");
        assert_eq!((author_id, post_id), (bob_id, id));
        assert_eq!(comment_count(&pool).await, 1);

        let reply = anonymous.get(&back).await;
        assert!(reply.body.contains("Nice post"));
        assert!(reply.body.contains("Bob"));
    }

    #[tokio::test]
    async fn deleted_post_is_gone() {
        let (app, pool) = app().await;
        let mut admin = signed_in(&app, "Alice", "a%40x.com").await;
        admin.post("/new-post", POST_FORM).await;
        let id = only_post_id(&pool).await;

        let reply = admin.get(&format!("/delete/{id}")).await;
        assert_eq!(reply.location.as_deref(), Some("/"));

        let reply = admin.get(&format!("/post/{id}")).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let (app, _pool) = app().await;
        let mut browser = signed_in(&app, "Alice", "a%40x.com").await;
        let stale = browser.cookies.clone();

        let reply = browser.get("/logout").await;
        assert_eq!(reply.location.as_deref(), Some("/"));
        assert!(!browser.has_session());

        // replaying the old cookie must not revive the session
        let mut replay = Browser::new(&app);
        replay.cookies = stale;
        assert_eq!(replay.get("/new-post").await.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn healthz_pings_the_database() {
        let (app, _pool) = app().await;
        let reply = Browser::new(&app).get("/healthz").await;
        assert_eq!(reply.status, StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&reply.body).expect("healthz must return json");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
    }
}
