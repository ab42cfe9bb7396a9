use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use super::{flash, page_layout, push_messages};
use crate::domain::comment::CreateCommentRequest;
use crate::domain::error::DomainError;
use crate::domain::post::PostContent;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, validation_messages};
use crate::presentation::http::middleware::session::{AdminUser, Viewer};
use crate::presentation::http::views::{CommentView, IndexPage, PostFormPage, PostPage, render};

pub(crate) const LOGIN_TO_COMMENT: &str = "You need to login or register to comment.";
pub(crate) const DUPLICATE_TITLE: &str = "A post with this title already exists.";
pub(crate) const POST_DELETED: &str = "Post deleted.";

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct PostForm {
    #[validate(length(min = 1, max = 250, message = "Title must be 1 to 250 characters."))]
    pub(crate) title: String,
    #[validate(length(min = 1, max = 250, message = "Subtitle must be 1 to 250 characters."))]
    pub(crate) subtitle: String,
    #[validate(url(message = "Image URL must be a valid URL."))]
    pub(crate) img_url: String,
    #[validate(length(min = 1, message = "Blog content must not be empty."))]
    pub(crate) body: String,
}

impl From<PostForm> for PostContent {
    fn from(form: PostForm) -> Self {
        Self {
            title: form.title,
            subtitle: form.subtitle,
            body: form.body,
            img_url: form.img_url,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct CommentForm {
    #[validate(length(min = 1, message = "Comment must not be empty."))]
    pub(crate) text: String,
}

pub(crate) async fn index(
    State(state): State<AppState>,
    viewer: Viewer,
    jar: CookieJar,
) -> AppResult<Response> {
    let posts = state.blog_service.list_posts().await?;
    let (jar, layout) = page_layout(&state, jar, &viewer, Vec::new());
    Ok((jar, render(&IndexPage { layout, posts })?).into_response())
}

pub(crate) async fn show_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    let details = state.blog_service.get_post_details(id).await?;
    let (jar, layout) = page_layout(&state, jar, &viewer, Vec::new());
    let page = PostPage {
        layout,
        post: details.post,
        comments: details.comments.into_iter().map(CommentView::from).collect(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub(crate) async fn add_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let Some(user) = viewer.0.as_ref() else {
        return Ok((flash(&state, jar, LOGIN_TO_COMMENT), Redirect::to("/login")).into_response());
    };
    let back = format!("/post/{id}");

    if let Err(errors) = form.validate() {
        let jar = push_messages(&state, jar, validation_messages(&errors));
        return Ok((jar, Redirect::to(&back)).into_response());
    }

    let req = CreateCommentRequest { text: form.text };
    match state.blog_service.add_comment(user.actor(), id, req).await {
        Ok(_) => Ok(Redirect::to(&back).into_response()),
        Err(err @ DomainError::Validation { .. }) => {
            Ok((flash(&state, jar, err.to_string()), Redirect::to(&back)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn new_post_page(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: CookieJar,
) -> AppResult<Response> {
    render_post_form(
        &state,
        jar,
        &Viewer(Some(admin)),
        PostFormMode::Create,
        PostContent::default(),
        Vec::new(),
    )
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let actor = admin.actor();
    let viewer = Viewer(Some(admin));

    if let Err(errors) = form.validate() {
        let messages = validation_messages(&errors);
        return render_post_form(&state, jar, &viewer, PostFormMode::Create, form.into(), messages);
    }

    let content = PostContent::from(form);
    match state.blog_service.create_post(actor, content.clone()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(DomainError::AlreadyExists(_)) => render_post_form(
            &state,
            jar,
            &viewer,
            PostFormMode::Create,
            content,
            vec![DUPLICATE_TITLE.to_string()],
        ),
        Err(err @ DomainError::Validation { .. }) => render_post_form(
            &state,
            jar,
            &viewer,
            PostFormMode::Create,
            content,
            vec![err.to_string()],
        ),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn edit_post_page(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    let post = state.blog_service.get_post(id).await?;
    render_post_form(
        &state,
        jar,
        &Viewer(Some(admin)),
        PostFormMode::Edit(post.id),
        PostContent::from(&post),
        Vec::new(),
    )
}

pub(crate) async fn update_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let actor = admin.actor();
    let viewer = Viewer(Some(admin));
    let mode = PostFormMode::Edit(id);

    if let Err(errors) = form.validate() {
        let messages = validation_messages(&errors);
        return render_post_form(&state, jar, &viewer, mode, form.into(), messages);
    }

    let content = PostContent::from(form);
    match state.blog_service.update_post(actor, id, content.clone()).await {
        Ok(post) => Ok(Redirect::to(&format!("/post/{}", post.id)).into_response()),
        Err(DomainError::AlreadyExists(_)) => render_post_form(
            &state,
            jar,
            &viewer,
            mode,
            content,
            vec![DUPLICATE_TITLE.to_string()],
        ),
        Err(err @ DomainError::Validation { .. }) => {
            render_post_form(&state, jar, &viewer, mode, content, vec![err.to_string()])
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn delete_post(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    state.blog_service.delete_post(admin.actor(), id).await?;
    Ok((flash(&state, jar, POST_DELETED), Redirect::to("/")).into_response())
}

#[derive(Debug, Clone, Copy)]
enum PostFormMode {
    Create,
    Edit(i64),
}

fn render_post_form(
    state: &AppState,
    jar: CookieJar,
    viewer: &Viewer,
    mode: PostFormMode,
    form: PostContent,
    messages: Vec<String>,
) -> AppResult<Response> {
    let (heading, action) = match mode {
        PostFormMode::Create => ("New Post", "/new-post".to_string()),
        PostFormMode::Edit(id) => ("Edit Post", format!("/edit-post/{id}")),
    };
    let (jar, layout) = page_layout(state, jar, viewer, messages);
    let page = PostFormPage {
        layout,
        heading,
        action,
        form,
    };
    Ok((jar, render(&page)?).into_response())
}
