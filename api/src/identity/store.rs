use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{db::DbPool, error::ServerError};

use super::{SessionRepository, models::user_profile::UserProfile};

pub struct PgSessionRepository {
    pool: DbPool,
}

impl PgSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserProfile>, ServerError> {
        use crate::schema::{sessions, user_profiles};

        let mut conn = self.pool.get().await?;
        let now = chrono::Utc::now().naive_utc();

        let profile = sessions::table
            .inner_join(user_profiles::table)
            .filter(sessions::token.eq(token))
            .filter(sessions::active.eq(true))
            .filter(sessions::expires_at.gt(now))
            .filter(sessions::issued_at.le(now))
            .select(UserProfile::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(profile)
    }

    async fn revoke(&self, token: &str) -> Result<(), ServerError> {
        use crate::schema::sessions;

        let mut conn = self.pool.get().await?;

        diesel::update(sessions::table.filter(sessions::token.eq(token)))
            .set(sessions::active.eq(false))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
