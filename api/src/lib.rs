use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    blog::comment::{CommentRepository, CommentStore},
    config::ServerConfig,
    identity::SessionRepository,
};

pub mod blog;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod identity;
pub mod json;
pub mod query;
pub mod real_ip;
pub mod schema;
pub mod security_headers;
pub mod telemetry;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct App {
    pub config: Arc<ServerConfig>,
    pub comments: CommentStore,
    pub sessions: Arc<dyn SessionRepository>,
}

impl App {
    pub fn new(
        config: ServerConfig,
        comments: Arc<dyn CommentRepository>,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            comments: CommentStore::new(comments),
            sessions,
        }
    }
}

pub fn router(app: App) -> Router {
    let config = app.config.clone();

    Router::new()
        .merge(health::route())
        .nest("/blogs", blog::routes::route())
        .nest("/identity", identity::routes::route())
        .with_state(app)
        .layer(middleware::from_fn_with_state(
            config.clone(),
            security_headers::set_security_headers,
        ))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_cors_origins()
        .into_iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(%error, %origin, "Skipping CORS origin that is not a valid header");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers([header::RETRY_AFTER])
        .max_age(Duration::from_secs(600))
}
