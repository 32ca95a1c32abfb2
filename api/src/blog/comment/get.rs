use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{App, error::AppError, identity::MaybeAuthUser, query::Query};

use super::{CommentNode, tree::SortOrder};

#[derive(Deserialize, Debug, Default)]
pub struct Queries {
    #[serde(default)]
    sort: SortOrder,
}

pub async fn get_comments(
    State(ctx): State<App>,
    Path(blog_id): Path<Uuid>,
    Query(q): Query<Queries>,
    auth_user: MaybeAuthUser,
) -> Result<Json<Vec<CommentNode>>, AppError> {
    let comments = ctx
        .comments
        .thread(blog_id, q.sort, &auth_user.actor())
        .await?;

    Ok(Json(comments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        identity::{AuthenticationError, Identity},
        testing,
    };

    fn anonymous() -> MaybeAuthUser {
        MaybeAuthUser(Err(AuthenticationError::NoCookie))
    }

    #[test]
    fn sort_defaults_to_oldest() {
        let q: Queries = serde_json::from_str("{}").unwrap();
        assert_eq!(q.sort, SortOrder::Oldest);

        let q: Queries = serde_json::from_str(r#"{"sort":"newest"}"#).unwrap();
        assert_eq!(q.sort, SortOrder::Newest);

        assert!(serde_json::from_str::<Queries>(r#"{"sort":"best"}"#).is_err());
    }

    #[tokio::test]
    async fn unknown_sort_is_a_json_400() {
        use axum::{
            extract::FromRequestParts,
            http::{Request, StatusCode, header},
            response::IntoResponse,
        };

        let (mut parts, _) = Request::builder()
            .uri("/blogs/x/comments?sort=best")
            .body(())
            .unwrap()
            .into_parts();

        let rejection = match Query::<Queries>::from_request_parts(&mut parts, &()).await {
            Err(rejection) => rejection,
            Ok(_) => panic!("an unknown sort order must be rejected"),
        };
        let response = rejection.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn blog_without_comments_is_empty() {
        let test = testing::app();
        let blog_id = test.add_blog().await;

        let Json(comments) = get_comments(
            State(test.app.clone()),
            Path(blog_id),
            Query(Queries::default()),
            anonymous(),
        )
        .await
        .unwrap();

        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn thread_reflects_viewer() {
        let test = testing::app();
        let blog_id = test.add_blog().await;
        let author = testing::profile("reader@example.com");
        let comment = test
            .app
            .comments
            .create(blog_id, None, &author, "hello")
            .await
            .unwrap();

        let Json(as_anonymous) = get_comments(
            State(test.app.clone()),
            Path(blog_id),
            Query(Queries::default()),
            anonymous(),
        )
        .await
        .unwrap();

        let identity = Identity::new(author, &test.app);
        let Json(as_author) = get_comments(
            State(test.app.clone()),
            Path(blog_id),
            Query(Queries {
                sort: SortOrder::Newest,
            }),
            MaybeAuthUser(Ok(identity)),
        )
        .await
        .unwrap();

        assert_eq!(as_anonymous[0].id, comment.id);
        assert!(!as_anonymous[0].can_delete);
        assert!(as_author[0].can_delete);

        let body = serde_json::to_value(&as_author).unwrap();
        assert_eq!(body[0]["content"], "hello");
        assert_eq!(body[0]["depth"], 0);
        assert!(body[0]["replies"].as_array().unwrap().is_empty());
    }
}
