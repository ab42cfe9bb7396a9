use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    author_name: String,
    author_email: String,
    text: String,
}

const SELECT_COMMENT: &str = r#"
    SELECT
        c.id,
        c.post_id,
        c.author_id,
        u.name AS author_name,
        u.email AS author_email,
        c.text
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (text, author_id, post_id)
            VALUES (?1, ?2, ?3)
            RETURNING id
            "#,
        )
        .bind(&input.text)
        .bind(input.author_id)
        .bind(input.post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        let row = sqlx::query_as::<_, CommentRow>(&format!("{SELECT_COMMENT} WHERE c.id = ?1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(Comment::from(row))
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{SELECT_COMMENT} WHERE c.post_id = ?1 ORDER BY c.id ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            author_name: row.author_name,
            author_email: row.author_email,
            text: row.text,
        }
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_foreign_key_violation()
    {
        return DomainError::NotFound("post or author".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
