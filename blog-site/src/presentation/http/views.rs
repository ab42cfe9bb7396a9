use askama::Template;
use axum::response::Html;
use sha2::{Digest, Sha256};

use crate::domain::comment::Comment;
use crate::domain::post::{Post, PostContent};
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::middleware::session::Viewer;

/// Data every page shares: who is looking and which flash messages to show.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    pub(crate) viewer_name: Option<String>,
    pub(crate) is_admin: bool,
    pub(crate) messages: Vec<String>,
}

impl Layout {
    pub(crate) fn new(viewer: &Viewer, messages: Vec<String>) -> Self {
        match &viewer.0 {
            Some(user) => Self {
                viewer_name: Some(user.name.clone()),
                is_admin: user.is_admin,
                messages,
            },
            None => Self {
                viewer_name: None,
                is_admin: false,
                messages,
            },
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub(crate) struct IndexPage {
    pub(crate) layout: Layout,
    pub(crate) posts: Vec<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentView {
    pub(crate) text: String,
    pub(crate) author_name: String,
    pub(crate) avatar_url: String,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            avatar_url: gravatar_url(&comment.author_email),
            text: comment.text,
            author_name: comment.author_name,
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub(crate) struct PostPage {
    pub(crate) layout: Layout,
    pub(crate) post: Post,
    pub(crate) comments: Vec<CommentView>,
}

#[derive(Template)]
#[template(path = "make_post.html")]
pub(crate) struct PostFormPage {
    pub(crate) layout: Layout,
    pub(crate) heading: &'static str,
    pub(crate) action: String,
    pub(crate) form: PostContent,
}

#[derive(Template)]
#[template(path = "register.html")]
pub(crate) struct RegisterPage {
    pub(crate) layout: Layout,
    pub(crate) name: String,
    pub(crate) email: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub(crate) struct LoginPage {
    pub(crate) layout: Layout,
    pub(crate) email: String,
}

#[derive(Template)]
#[template(path = "about.html")]
pub(crate) struct AboutPage {
    pub(crate) layout: Layout,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub(crate) struct ContactPage {
    pub(crate) layout: Layout,
}

#[derive(Template)]
#[template(path = "error.html")]
pub(crate) struct ErrorPage {
    pub(crate) status: u16,
    pub(crate) reason: &'static str,
    pub(crate) message: String,
}

pub(crate) fn render<T: Template>(page: &T) -> AppResult<Html<String>> {
    page.render()
        .map(Html)
        .map_err(|err| AppError::Internal(err.into()))
}

/// Gravatar accepts SHA-256 hashes of the trimmed, lowercased address.
pub(crate) fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let hash: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("https://www.gravatar.com/avatar/{hash}?s=100&d=retro&r=g")
}
