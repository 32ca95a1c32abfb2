use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    App, blog::models::blog_comment::BlogComment, error::AppError, identity::AuthUser,
    real_ip::ClientIp,
};

#[derive(Deserialize, Debug)]
pub struct CommentSubmission {
    content: String,

    #[serde(default)]
    parent_id: Option<Uuid>,
}

#[debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    Path(blog_id): Path<Uuid>,
    ClientIp(ip): ClientIp,
    AuthUser(auth_user): AuthUser,
    crate::json::Json(submission): crate::json::Json<CommentSubmission>,
) -> Result<(StatusCode, Json<BlogComment>), AppError> {
    tracing::debug!(%ip, %blog_id, parent_id = ?submission.parent_id, "Comment submitted");

    let comment = ctx
        .comments
        .create(
            blog_id,
            submission.parent_id,
            &auth_user.profile,
            &submission.content,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
