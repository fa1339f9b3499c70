use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo_core::Point;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Presence;
use crate::repository::PresenceStore;

/// Postgres-backed presence store
#[derive(Clone)]
pub struct PgPresenceStore {
    pool: PgPool,
}

impl PgPresenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceStore for PgPresenceStore {
    async fn upsert_presence(&self, user_id: Uuid, location: Point) -> Result<Presence> {
        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO user_presence (user_id, lng, lat, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET lng = EXCLUDED.lng, lat = EXCLUDED.lat, updated_at = NOW()
            RETURNING updated_at
            "#,
        )
        .bind(user_id)
        .bind(location.lng)
        .bind(location.lat)
        .fetch_one(&self.pool)
        .await?;

        Ok(Presence {
            user_id,
            location,
            updated_at,
        })
    }
}
