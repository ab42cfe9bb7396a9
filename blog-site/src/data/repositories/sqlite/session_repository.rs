use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::data::session_repository::{NewSession, SessionRecord, SessionRepository};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: i64,
    expires_at: i64,
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create_session(&self, input: NewSession) -> Result<SessionRecord, DomainError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(&input.id)
        .bind(input.user_id)
        .bind(input.created_at)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_session_db_error)?;

        Ok(row.into())
    }

    async fn find_active(&self, id: &str, now: i64) -> Result<Option<SessionRecord>, DomainError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE id = ?1 AND expires_at > ?2
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_session_db_error)?;

        Ok(row.map(SessionRecord::from))
    }

    async fn delete_session(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_session_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: i64) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_session_db_error)?;

        Ok(result.rows_affected())
    }
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            expires_at: row.expires_at,
        }
    }
}

fn map_session_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_foreign_key_violation()
    {
        return DomainError::NotFound("user".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
