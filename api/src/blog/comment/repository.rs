use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::{
    blog::models::blog_comment::{BlogComment, NewBlogComment},
    db::DbPool,
    error::ServerError,
    schema::{blog_posts, comments},
};

use super::CommentRepository;

pub struct PgCommentRepository {
    pool: DbPool,
}

impl PgCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn blog_exists(&self, blog_id: Uuid) -> Result<bool, ServerError> {
        let mut conn = self.pool.get().await?;

        let exists = diesel::select(diesel::dsl::exists(
            blog_posts::table.filter(blog_posts::id.eq(blog_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await?;

        Ok(exists)
    }

    async fn find(
        &self,
        blog_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<BlogComment>, ServerError> {
        let mut conn = self.pool.get().await?;

        let comment = comments::table
            .filter(comments::id.eq(comment_id))
            .filter(comments::blog_id.eq(blog_id))
            .select(BlogComment::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(comment)
    }

    async fn insert(&self, comment: NewBlogComment) -> Result<BlogComment, ServerError> {
        let mut conn = self.pool.get().await?;

        let inserted = diesel::insert_into(comments::table)
            .values(&comment)
            .returning(BlogComment::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(inserted)
    }

    async fn list_for_blog(&self, blog_id: Uuid) -> Result<Vec<BlogComment>, ServerError> {
        let mut conn = self.pool.get().await?;

        let rows = comments::table
            .filter(comments::blog_id.eq(blog_id))
            .select(BlogComment::as_select())
            .load(&mut conn)
            .await?;

        Ok(rows)
    }

    async fn mark_deleted(&self, comment_id: Uuid) -> Result<Option<BlogComment>, ServerError> {
        let mut conn = self.pool.get().await?;

        // a single UPDATE, concurrent deletes of the same row both succeed
        let updated = diesel::update(comments::table.filter(comments::id.eq(comment_id)))
            .set(comments::is_deleted.eq(true))
            .returning(BlogComment::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        Ok(updated)
    }
}
