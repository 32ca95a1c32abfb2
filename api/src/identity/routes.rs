use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;
use uuid::Uuid;

use crate::{App, error::AppError};

use super::{MaybeAuthUser, session_token};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/session", get(session_status))
        .route("/logout", post(logout))
}

#[derive(serde::Serialize, Debug, PartialEq)]
pub struct SessionStatus {
    is_auth: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,

    is_admin: bool,
}

impl From<&MaybeAuthUser> for SessionStatus {
    fn from(MaybeAuthUser(identity): &MaybeAuthUser) -> Self {
        let identity = identity.as_ref().ok();
        SessionStatus {
            is_auth: identity.is_some(),
            id: identity.map(|i| i.profile.id),
            name: identity.map(|i| i.profile.name.clone()),
            avatar_url: identity.and_then(|i| i.profile.avatar_url.clone()),
            is_admin: identity.map(|i| i.is_admin).unwrap_or(false),
        }
    }
}

async fn session_status(auth_user: MaybeAuthUser) -> impl IntoResponse {
    // session state is per user, never let a CDN cache it
    (
        [
            (header::CACHE_CONTROL, "no-store, max-age=0, private"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(SessionStatus::from(&auth_user)),
    )
}

async fn logout(
    State(ctx): State<App>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let cookie_name = ctx.config.session_cookie_name.clone();

    if let Some(token) = session_token(&headers, &cookie_name) {
        ctx.sessions.revoke(&token).await?;
        tracing::info!("Session revoked on logout");
    }

    let expired = Cookie::build((cookie_name, ""))
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .path("/");

    Ok((StatusCode::NO_CONTENT, CookieJar::new().add(expired)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        identity::{Identity, SessionRepository},
        testing,
    };

    #[test]
    fn anonymous_session_status() {
        let status = SessionStatus::from(&MaybeAuthUser(Err(
            crate::identity::AuthenticationError::NoCookie,
        )));
        assert!(!status.is_auth);
        assert!(status.id.is_none());
        assert!(!status.is_admin);
    }

    #[test]
    fn authenticated_session_status() {
        let test = testing::app();
        let profile = testing::profile("admin@example.com");
        let identity = Identity::new(profile.clone(), &test.app);

        let status = SessionStatus::from(&MaybeAuthUser(Ok(identity)));

        assert!(status.is_auth);
        assert_eq!(status.id, Some(profile.id));
        assert_eq!(status.name.as_deref(), Some(profile.name.as_str()));
        assert!(status.is_admin);
    }

    #[tokio::test]
    async fn logout_revokes_session_and_expires_cookie() {
        let test = testing::app();
        let profile = testing::profile("reader@example.com");
        test.add_session("tok-logout", profile).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "portfolio_session=tok-logout".parse().unwrap(),
        );

        let response = logout(State(test.app.clone()), headers)
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("portfolio_session="));
        assert!(set_cookie.contains("Max-Age=0"));
        assert!(
            test.sessions
                .find_user_by_token("tok-logout")
                .await
                .unwrap()
                .is_none()
        );
    }
}
