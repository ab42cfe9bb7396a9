use chrono::Utc;
use tracing::{info, warn};

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::comment::{Comment, CreateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostContent, display_date};
use crate::domain::user::Actor;

#[derive(Debug, Clone)]
pub(crate) struct PostDetails {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
}

pub(crate) struct BlogService<P: PostRepository, C: CommentRepository> {
    posts: P,
    comments: C,
}

impl<P: PostRepository, C: CommentRepository> BlogService<P, C> {
    pub(crate) fn new(posts: P, comments: C) -> Self {
        Self { posts, comments }
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.posts.list_posts().await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or(DomainError::NotFound(format!("post {id}")))
    }

    pub(crate) async fn get_post_details(&self, id: i64) -> Result<PostDetails, DomainError> {
        let post = self.get_post(id).await?;
        let comments = self.comments.list_for_post(post.id).await?;
        Ok(PostDetails { post, comments })
    }

    pub(crate) async fn create_post(
        &self,
        actor: Actor,
        req: PostContent,
    ) -> Result<Post, DomainError> {
        ensure_admin(actor, "create post")?;
        let req = req.validate()?;

        let new_post = NewPost {
            author_id: actor.user_id,
            title: req.title,
            subtitle: req.subtitle,
            body: req.body,
            img_url: req.img_url,
            date: display_date(Utc::now().date_naive()),
        };
        let post = self.posts.create_post(new_post).await?;

        info!(post_id = post.id, "post created");
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        actor: Actor,
        post_id: i64,
        req: PostContent,
    ) -> Result<Post, DomainError> {
        ensure_admin(actor, "edit post")?;
        let req = req.validate()?;

        let patch = PostPatch {
            title: req.title,
            subtitle: req.subtitle,
            body: req.body,
            img_url: req.img_url,
        };
        let post = self
            .posts
            .update_post(post_id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("post {post_id}")))?;

        info!(post_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn delete_post(&self, actor: Actor, post_id: i64) -> Result<(), DomainError> {
        ensure_admin(actor, "delete post")?;

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post {post_id}")));
        }

        info!(post_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn add_comment(
        &self,
        actor: Actor,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        let post = self.get_post(post_id).await?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id: actor.user_id,
                text: req.text,
            })
            .await?;

        info!(post_id, comment_id = comment.id, "comment added");
        Ok(comment)
    }
}

fn ensure_admin(actor: Actor, action: &'static str) -> Result<(), DomainError> {
    if !actor.is_admin {
        warn!(user_id = actor.user_id, action, "non-admin attempted admin action");
        return Err(DomainError::Forbidden);
    }
    Ok(())
}
