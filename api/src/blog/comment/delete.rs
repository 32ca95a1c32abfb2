use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{App, error::AppError, identity::AuthUser, real_ip::ClientIp};

#[debug_handler]
pub async fn delete_comment(
    State(ctx): State<App>,
    Path((blog_id, comment_id)): Path<(Uuid, Uuid)>,
    ClientIp(ip): ClientIp,
    AuthUser(auth_user): AuthUser,
) -> Result<StatusCode, AppError> {
    tracing::debug!(%ip, %blog_id, %comment_id, "Comment delete requested");

    ctx.comments
        .soft_delete(blog_id, comment_id, &auth_user.actor())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
