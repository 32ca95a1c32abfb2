use diesel_async::{
    AsyncPgConnection, RunQueryDsl,
    pooled_connection::{
        AsyncDieselConnectionManager,
        deadpool::{BuildError, Pool},
    },
};

use crate::{config::ServerConfig, error::ServerError};

pub type DbPool = Pool<AsyncPgConnection>;

pub fn build_pool(config: &ServerConfig) -> Result<DbPool, BuildError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    Pool::builder(manager)
        .max_size(config.database_pool_size)
        .build()
}

/// Fails fast at startup instead of on the first request.
pub async fn check_connection(pool: &DbPool) -> Result<(), ServerError> {
    let mut conn = pool.get().await?;
    diesel::sql_query("SELECT 1").execute(&mut conn).await?;
    Ok(())
}
