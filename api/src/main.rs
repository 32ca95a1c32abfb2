use std::{net::SocketAddr, sync::Arc};

use dotenv::dotenv;
use mimalloc::MiMalloc;

use portfolio_api::{
    App,
    blog::comment::PgCommentRepository,
    config::ServerConfig,
    db,
    identity::PgSessionRepository,
    router, telemetry,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let config = ServerConfig::new_from_env()?;
    telemetry::init(config.env);

    let pool = db::build_pool(&config)?;
    if let Err(error) = db::check_connection(&pool).await {
        tracing::error!(%error, "Database connectivity check failed");
        return Err(error.into());
    }
    tracing::info!(
        "Portfolio API ready - connected to {}",
        config.redacted_database_url()
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let app = App::new(
        config,
        Arc::new(PgCommentRepository::new(pool.clone())),
        Arc::new(PgSessionRepository::new(pool)),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(
        listener,
        router(app).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Portfolio API shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for the shutdown signal");
    }
}
