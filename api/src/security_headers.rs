use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::config::ServerConfig;

const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; \
         form-action 'self'; connect-src 'self'; img-src 'self' data: https:; \
         script-src 'none'; style-src 'none';",
    ),
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    (
        "permissions-policy",
        "accelerometer=(), ambient-light-sensor=(), autoplay=(), battery=(), \
         camera=(), clipboard-read=(), clipboard-write=*, display-capture=(), \
         fullscreen=*, geolocation=(), gyroscope=(), hid=(), microphone=(), \
         midi=(), payment=(), usb=()",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "cross-origin"),
    ("cross-origin-embedder-policy", "require-corp"),
    ("x-permitted-cross-domain-policies", "none"),
    ("cache-control", "no-store"),
    ("pragma", "no-cache"),
];

const HSTS: &str = "max-age=63072000; includeSubDomains; preload";

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub async fn set_security_headers(
    State(config): State<Arc<ServerConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request.headers().get(&X_REQUEST_ID).cloned();

    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), request_id, config.enable_hsts);
    response
}

/// Adds the hardening headers. Anything a handler already set wins.
pub fn apply_security_headers(
    headers: &mut HeaderMap,
    request_id: Option<HeaderValue>,
    enable_hsts: bool,
) {
    for (name, value) in SECURITY_HEADERS {
        headers
            .entry(HeaderName::from_static(*name))
            .or_insert_with(|| HeaderValue::from_static(*value));
    }

    if enable_hsts {
        headers
            .entry(HeaderName::from_static("strict-transport-security"))
            .or_insert_with(|| HeaderValue::from_static(HSTS));
    }

    if let Some(request_id) = request_id {
        headers.entry(X_REQUEST_ID.clone()).or_insert(request_id);
    }
}
