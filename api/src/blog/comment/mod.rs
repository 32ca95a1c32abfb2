pub mod create;
pub mod delete;
pub mod get;
pub mod policy;
mod repository;
pub mod tree;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    blog::models::blog_comment::{BlogComment, NewBlogComment},
    error::{AppError, ServerError},
    identity::{Actor, models::user_profile::UserProfile},
    utils::{escape_angle_brackets, strip_markup},
};

pub use repository::PgCommentRepository;

use self::tree::SortOrder;

pub const MAX_CONTENT_LENGTH: usize = 5000;

#[derive(thiserror::Error, Debug)]
pub enum CommentError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("You are not allowed to delete this comment")]
    Permission,

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl From<CommentError> for AppError {
    fn from(e: CommentError) -> Self {
        let status = match e {
            CommentError::Server(error) => return error.into(),
            CommentError::Validation { .. } => StatusCode::BAD_REQUEST,
            CommentError::NotFound(_) => StatusCode::NOT_FOUND,
            CommentError::Permission => StatusCode::FORBIDDEN,
        };

        (e.to_string(), status).into()
    }
}

// The model that will be returned to the client
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentNode {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub parent_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,

    pub user_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,

    pub content: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub depth: usize,
    pub can_reply: bool,
    pub can_delete: bool,
    pub replies: Vec<CommentNode>,
}

/// Storage of comment rows. Implementations do no validation of their own.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn blog_exists(&self, blog_id: Uuid) -> Result<bool, ServerError>;

    /// A comment by id, only if it belongs to `blog_id`.
    async fn find(&self, blog_id: Uuid, comment_id: Uuid)
    -> Result<Option<BlogComment>, ServerError>;

    async fn insert(&self, comment: NewBlogComment) -> Result<BlogComment, ServerError>;

    async fn list_for_blog(&self, blog_id: Uuid) -> Result<Vec<BlogComment>, ServerError>;

    /// Sets the tombstone flag and returns the updated row.
    async fn mark_deleted(&self, comment_id: Uuid) -> Result<Option<BlogComment>, ServerError>;
}

#[derive(Clone)]
pub struct CommentStore {
    repo: Arc<dyn CommentRepository>,
}

impl CommentStore {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        blog_id: Uuid,
        parent_id: Option<Uuid>,
        author: &UserProfile,
        content: &str,
    ) -> Result<BlogComment, CommentError> {
        // the limit applies to what the author typed, not to the escaped form
        let text = strip_markup(content);

        if text.is_empty() {
            return Err(CommentError::Validation {
                field: "content",
                message: "comment must not be empty",
            });
        }

        if text.chars().count() > MAX_CONTENT_LENGTH {
            return Err(CommentError::Validation {
                field: "content",
                message: "comment is too long (max 5000 characters)",
            });
        }

        let content = escape_angle_brackets(&text);

        if !self.repo.blog_exists(blog_id).await? {
            return Err(CommentError::NotFound("Blog post"));
        }

        if let Some(parent_id) = parent_id {
            let parent = self
                .repo
                .find(blog_id, parent_id)
                .await?
                .ok_or(CommentError::NotFound("Parent comment"))?;

            if parent.is_deleted {
                return Err(CommentError::Validation {
                    field: "parent_id",
                    message: "cannot reply to a deleted comment",
                });
            }
        }

        let comment = self
            .repo
            .insert(NewBlogComment {
                id: Uuid::new_v4(),
                blog_id,
                parent_id,
                user_id: author.id,
                user_name: author.name.clone(),
                user_avatar: author.avatar_url.clone(),
                content,
                is_deleted: false,
                created_at: chrono::Utc::now().naive_utc(),
            })
            .await?;

        tracing::info!(comment_id = %comment.id, %blog_id, user_id = %author.id, "Comment created");

        Ok(comment)
    }

    /// Every comment of the blog, tombstones included, in no particular order.
    pub async fn list_for_blog(&self, blog_id: Uuid) -> Result<Vec<BlogComment>, CommentError> {
        Ok(self.repo.list_for_blog(blog_id).await?)
    }

    /// The blog's comments as reply trees, as seen by `actor`.
    pub async fn thread(
        &self,
        blog_id: Uuid,
        sort: SortOrder,
        actor: &Actor,
    ) -> Result<Vec<CommentNode>, CommentError> {
        let comments = self.list_for_blog(blog_id).await?;
        Ok(tree::build_tree(comments, sort, actor))
    }

    /// Tombstones a comment. Deleting an already deleted comment succeeds
    /// without touching it.
    pub async fn soft_delete(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
        actor: &Actor,
    ) -> Result<BlogComment, CommentError> {
        let comment = self
            .repo
            .find(blog_id, comment_id)
            .await?
            .ok_or(CommentError::NotFound("Comment"))?;

        if !policy::can_delete(actor, &comment) {
            tracing::warn!(%comment_id, ?actor, "Refused to delete comment");
            return Err(CommentError::Permission);
        }

        if comment.is_deleted {
            return Ok(comment);
        }

        let deleted = self
            .repo
            .mark_deleted(comment_id)
            .await?
            .ok_or(CommentError::NotFound("Comment"))?;

        tracing::info!(%comment_id, %blog_id, ?actor, "Comment deleted");

        Ok(deleted)
    }
}
