use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    add_comment, create_post, delete_post, edit_post_page, index, new_post_page, show_post,
    update_post,
};

pub(crate) fn router() -> Router<AppState> {
    let public = Router::new()
        .route("/", get(index))
        .route("/post/{id}", get(show_post).post(add_comment));

    // gated per handler by the `AdminUser` extractor
    let admin = Router::new()
        .route("/new-post", get(new_post_page).post(create_post))
        .route("/edit-post/{id}", get(edit_post_page).post(update_post))
        .route("/delete/{id}", get(delete_post));

    public.merge(admin)
}
