use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    App,
    error::{ApiRequestError, AppError, ServerError},
};

use self::models::user_profile::UserProfile;

pub mod models;
pub mod routes;
mod store;

pub use store::PgSessionRepository;

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error("Authentication required, but no session cookie was found.")]
    NoCookie,

    #[error(
        "Unauthorized, please check if you're logged in by refreshing the \
         page. This could be due to an expired session or token has became invalid."
    )]
    Unauthorized,
}

impl ApiRequestError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

/// Looks up who a session token belongs to. Sessions are created by the SSO
/// flow; this service only reads and revokes them.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// The profile behind an active, unexpired session.
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserProfile>, ServerError>;

    async fn revoke(&self, token: &str) -> Result<(), ServerError>;
}

/// Who is making a request, as far as permissions are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated { id: Uuid, is_admin: bool },
}

/// A signed-in commenter.
#[derive(Debug, Clone)]
pub struct Identity {
    pub profile: UserProfile,
    pub is_admin: bool,
}

impl Identity {
    pub fn new(profile: UserProfile, app: &App) -> Self {
        let is_admin = app.config.is_admin_email(&profile.email);
        Self { profile, is_admin }
    }

    pub fn actor(&self) -> Actor {
        Actor::Authenticated {
            id: self.profile.id,
            is_admin: self.is_admin,
        }
    }
}

pub struct MaybeAuthUser(pub Result<Identity, AuthenticationError>);

impl MaybeAuthUser {
    pub fn actor(&self) -> Actor {
        match &self.0 {
            Ok(identity) => identity.actor(),
            Err(_) => Actor::Anonymous,
        }
    }
}

pub(crate) fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

impl axum::extract::FromRequestParts<App> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers, &state.config.session_cookie_name) else {
            return Ok(MaybeAuthUser(Err(AuthenticationError::NoCookie)));
        };

        let profile = state.sessions.find_user_by_token(&token).await?;

        Ok(MaybeAuthUser(
            profile
                .map(|profile| Identity::new(profile, state))
                .ok_or(AuthenticationError::Unauthorized),
        ))
    }
}

pub struct AuthUser(pub Identity);

impl axum::extract::FromRequestParts<App> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(auth_user) = MaybeAuthUser::from_request_parts(parts, state).await?;

        Ok(AuthUser(auth_user?))
    }
}
