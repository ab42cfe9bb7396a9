use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    author_name: String,
    title: String,
    subtitle: String,
    body: String,
    img_url: String,
    date: String,
}

const SELECT_POST: &str = r#"
    SELECT
        p.id,
        p.author_id,
        u.name AS author_name,
        p.title,
        p.subtitle,
        p.body,
        p.img_url,
        p.date
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (author_id, title, subtitle, body, img_url, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            "#,
        )
        .bind(input.author_id)
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.body)
        .bind(&input.img_url)
        .bind(&input.date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        self.get_post(id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("post {id} vanished after insert")))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POST} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?2,
                subtitle = ?3,
                body = ?4,
                img_url = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.subtitle)
        .bind(&patch.body)
        .bind(&patch.img_url)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POST} ORDER BY p.id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            author_name: row.author_name,
            title: row.title,
            subtitle: row.subtitle,
            body: row.body,
            img_url: row.img_url,
            date: row.date,
        }
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DomainError::AlreadyExists("title".to_string());
        }
        if db_err.is_foreign_key_violation() {
            return DomainError::NotFound("author".to_string());
        }
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::SqlitePostRepository;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
    use crate::data::repositories::sqlite::comment_repository::SqliteCommentRepository;
    use crate::data::repositories::sqlite::user_repository::SqliteUserRepository;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::error::DomainError;
    use crate::infrastructure::database::test_pool;

    async fn seed_author(repo: &SqliteUserRepository) -> i64 {
        repo.create_user(NewUser {
            name: "Admin".to_string(),
            email: "admin@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        })
        .await
        .expect("author insert must succeed")
        .id
    }

    fn new_post(author_id: i64, title: &str) -> NewPost {
        NewPost {
            author_id,
            title: title.to_string(),
            subtitle: "subtitle".to_string(),
            body: "<p>body</p>".to_string(),
            img_url: "https://images.example.com/a.jpg".to_string(),
            date: "October 19, 2026".to_string(),
        }
    }

    #[tokio::test]
    async fn create_post_joins_author_name() {
        let pool = test_pool().await;
        let author_id = seed_author(&SqliteUserRepository::new(pool.clone())).await;
        let repo = SqlitePostRepository::new(pool);

        let post = repo
            .create_post(new_post(author_id, "First"))
            .await
            .expect("insert must succeed");
        assert_eq!(post.author_id, author_id);
        assert_eq!(post.author_name, "Admin");
        assert_eq!(post.date, "October 19, 2026");
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let pool = test_pool().await;
        let author_id = seed_author(&SqliteUserRepository::new(pool.clone())).await;
        let repo = SqlitePostRepository::new(pool);

        repo.create_post(new_post(author_id, "Same"))
            .await
            .expect("insert must succeed");
        let err = repo
            .create_post(new_post(author_id, "Same"))
            .await
            .expect_err("duplicate title must fail");
        assert!(matches!(err, DomainError::AlreadyExists(ref what) if what == "title"));
    }

    #[tokio::test]
    async fn missing_author_is_rejected() {
        let repo = SqlitePostRepository::new(test_pool().await);
        let err = repo
            .create_post(new_post(404, "Orphan"))
            .await
            .expect_err("unknown author must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_returns_none_for_missing_id() {
        let repo = SqlitePostRepository::new(test_pool().await);
        let patch = PostPatch {
            title: "t".to_string(),
            subtitle: "s".to_string(),
            body: "b".to_string(),
            img_url: "https://images.example.com/a.jpg".to_string(),
        };
        let updated = repo.update_post(99, patch).await.expect("query must succeed");
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn delete_post_cascades_to_comments() {
        let pool = test_pool().await;
        let author_id = seed_author(&SqliteUserRepository::new(pool.clone())).await;
        let posts = SqlitePostRepository::new(pool.clone());
        let comments = SqliteCommentRepository::new(pool.clone());

        let post = posts
            .create_post(new_post(author_id, "Doomed"))
            .await
            .expect("insert must succeed");
        comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id,
                text: "first!".to_string(),
            })
            .await
            .expect("comment insert must succeed");

        assert!(posts.delete_post(post.id).await.expect("delete must succeed"));
        assert!(posts.get_post(post.id).await.expect("query must succeed").is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&pool)
            .await
            .expect("count must succeed");
        assert_eq!(remaining, 0);
        assert!(!posts.delete_post(post.id).await.expect("delete must succeed"));
    }
}
