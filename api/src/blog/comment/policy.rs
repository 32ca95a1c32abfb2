use crate::{blog::models::blog_comment::BlogComment, identity::Actor};

use super::CommentNode;

/// Nodes at this depth or deeper are shown without a reply button. Storage
/// does not enforce it.
pub const MAX_REPLY_DEPTH: usize = 3;

/// Deepest level at which a reply is nested inside its parent. Replies below
/// it are listed flat, in thread order, under the ancestor at this level so
/// that rendering and dropping a tree never recurse without bound. Each node
/// keeps its own `depth` and `parent_id`.
pub const MAX_NEST_DEPTH: usize = 32;

/// Shown in place of the content and author of a deleted comment.
pub const DELETED_PLACEHOLDER: &str = "[deleted]";

/// Only the author of a comment or an administrator may delete it.
pub fn can_delete(actor: &Actor, comment: &BlogComment) -> bool {
    match actor {
        Actor::Anonymous => false,
        Actor::Authenticated { id, is_admin } => *is_admin || *id == comment.user_id,
    }
}

/// Turns a stored comment into the node the client sees. Tombstones keep
/// their place in the tree but nothing of what was written or who wrote it.
pub fn present(comment: BlogComment, depth: usize, actor: &Actor) -> CommentNode {
    if comment.is_deleted {
        return CommentNode {
            id: comment.id,
            blog_id: comment.blog_id,
            parent_id: comment.parent_id,
            user_id: None,
            user_name: DELETED_PLACEHOLDER.into(),
            user_avatar: None,
            content: DELETED_PLACEHOLDER.into(),
            is_deleted: true,
            created_at: comment.created_at,
            depth,
            can_reply: false,
            can_delete: false,
            replies: Vec::new(),
        };
    }

    let can_delete = can_delete(actor, &comment);

    CommentNode {
        id: comment.id,
        blog_id: comment.blog_id,
        parent_id: comment.parent_id,
        user_id: Some(comment.user_id),
        user_name: comment.user_name,
        user_avatar: comment.user_avatar,
        content: comment.content,
        is_deleted: false,
        created_at: comment.created_at,
        depth,
        can_reply: depth < MAX_REPLY_DEPTH,
        can_delete,
        replies: Vec::new(),
    }
}
