use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::App;

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/", get(read_root))
        .route("/healthz", get(health_check))
}

async fn read_root() -> Json<Value> {
    Json(json!({ "message": "Portfolio API is running." }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
    }
}
