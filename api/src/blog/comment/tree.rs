use std::{cmp::Ordering, collections::HashMap};

use serde::Deserialize;
use uuid::Uuid;

use crate::{blog::models::blog_comment::BlogComment, identity::Actor};

use super::{CommentNode, policy};

/// Order of the top-level comments. Replies are always oldest first.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Oldest,
    Newest,
}

/// Assembles the flat comments of one blog into reply trees.
///
/// Comments are kept in an arena and linked through child index lists. A
/// comment whose parent is missing from the input (or belongs to another
/// blog) is promoted to the top level, so every input comment is emitted
/// exactly once. Traversal uses an explicit stack, and nesting of the output
/// stops at [`policy::MAX_NEST_DEPTH`]: deeper replies hang flat off the
/// ancestor at that level.
pub fn build_tree(comments: Vec<BlogComment>, sort: SortOrder, actor: &Actor) -> Vec<CommentNode> {
    let len = comments.len();
    let index: HashMap<Uuid, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, comment)| (comment.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
    let mut roots = Vec::new();

    for (i, comment) in comments.iter().enumerate() {
        let parent = comment
            .parent_id
            .and_then(|parent_id| index.get(&parent_id).copied())
            .filter(|&p| p != i && comments[p].blog_id == comment.blog_id);

        match parent {
            Some(p) => children[p].push(i),
            None => roots.push(i),
        }
    }

    let by_age = |a: &usize, b: &usize| -> Ordering {
        let (a, b) = (&comments[*a], &comments[*b]);
        (a.created_at, a.id).cmp(&(b.created_at, b.id))
    };

    for siblings in &mut children {
        siblings.sort_by(by_age);
    }

    roots.sort_by(by_age);
    if sort == SortOrder::Newest {
        roots.reverse();
    }

    let mut visited = vec![false; len];
    let mut order = Vec::with_capacity(len);
    let mut top_level = Vec::with_capacity(roots.len());

    for root in roots {
        walk(root, &children, &mut visited, &mut order);
        top_level.push(root);
    }

    // only reachable with cyclic parent links
    let mut stranded: Vec<usize> = (0..len).filter(|&i| !visited[i]).collect();
    if !stranded.is_empty() {
        tracing::warn!(count = stranded.len(), "Comments with cyclic parents promoted to top level");
        stranded.sort_by(by_age);
        for root in stranded {
            if !visited[root] {
                walk(root, &children, &mut visited, &mut order);
                top_level.push(root);
            }
        }
    }

    let mut slots: Vec<Option<BlogComment>> = comments.into_iter().map(Some).collect();
    let mut nodes: Vec<Option<CommentNode>> = (0..len).map(|_| None).collect();

    for visit in &order {
        nodes[visit.index] = slots[visit.index]
            .take()
            .map(|comment| policy::present(comment, visit.depth, actor));
    }

    // Pre-order puts every node before its descendants, so walking it
    // backwards finishes each subtree before attaching it to its parent.
    for visit in order.iter().rev() {
        let Some(mut node) = nodes[visit.index].take() else {
            continue;
        };
        node.replies.reverse();

        match visit.parent {
            Some(parent) => {
                if let Some(parent) = nodes[parent].as_mut() {
                    parent.replies.push(node);
                }
            }
            None => nodes[visit.index] = Some(node),
        }
    }

    top_level
        .into_iter()
        .filter_map(|root| nodes[root].take())
        .collect()
}

struct Visit {
    index: usize,
    depth: usize,
    /// Level in the output tree, never above `MAX_NEST_DEPTH`.
    nest: usize,
    /// Node whose `replies` this one is attached to.
    parent: Option<usize>,
}

fn walk(root: usize, children: &[Vec<usize>], visited: &mut [bool], order: &mut Vec<Visit>) {
    let mut stack = vec![Visit {
        index: root,
        depth: 0,
        nest: 0,
        parent: None,
    }];

    while let Some(visit) = stack.pop() {
        if visited[visit.index] {
            continue;
        }
        visited[visit.index] = true;

        let (nest, parent) = if visit.nest < policy::MAX_NEST_DEPTH {
            (visit.nest + 1, Some(visit.index))
        } else {
            (visit.nest, visit.parent)
        };

        stack.extend(children[visit.index].iter().rev().map(|&child| Visit {
            index: child,
            depth: visit.depth + 1,
            nest,
            parent,
        }));
        order.push(visit);
    }
}
