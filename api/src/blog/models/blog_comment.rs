use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// A stored comment. Deleted comments keep their row; `is_deleted` is the
/// tombstone flag and the read path decides what of it is shown.
#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlogComment {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewBlogComment {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
}

impl From<NewBlogComment> for BlogComment {
    fn from(new: NewBlogComment) -> Self {
        BlogComment {
            id: new.id,
            blog_id: new.blog_id,
            parent_id: new.parent_id,
            user_id: new.user_id,
            user_name: new.user_name,
            user_avatar: new.user_avatar,
            content: new.content,
            is_deleted: new.is_deleted,
            created_at: new.created_at,
        }
    }
}
