use axum::{
    Router,
    routing::{delete, get},
};

use crate::App;

use super::comment::{create::create_comment, delete::delete_comment, get::get_comments};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/{blog_id}/comments", get(get_comments).post(create_comment))
        .route("/{blog_id}/comments/{comment_id}", delete(delete_comment))
}
