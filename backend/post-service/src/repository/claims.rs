use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo_core::Point;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Address, AddressClaim, BlockClaim};
use crate::repository::ClaimStore;
use crate::services::claims::MAX_ACTIVE_CLAIMS;

/// Postgres-backed claim store
#[derive(Clone)]
pub struct PgClaimStore {
    pool: PgPool,
}

impl PgClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BlockClaimRow {
    id: Uuid,
    owner_id: Uuid,
    lng: f64,
    lat: f64,
    radius_miles: f64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlockClaimRow> for BlockClaim {
    type Error = AppError;

    fn try_from(row: BlockClaimRow) -> Result<Self> {
        let center = Point::new(row.lng, row.lat)
            .map_err(|err| AppError::StoreUnavailable(err.to_string()))?;

        Ok(BlockClaim {
            id: row.id,
            owner_id: row.owner_id,
            center,
            radius_miles: row.radius_miles,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CLAIM_COLUMNS: &str = "id, owner_id, lng, lat, radius_miles, active, created_at, updated_at";

#[async_trait]
impl ClaimStore for PgClaimStore {
    async fn insert_block_claim(
        &self,
        owner_id: Uuid,
        center: Point,
        radius_miles: f64,
    ) -> Result<BlockClaim> {
        // The cap must hold against concurrent requests, so the owner's
        // active rows are locked before counting.
        let mut tx = self.pool.begin().await?;

        let active: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM block_claims
            WHERE owner_id = $1 AND active = TRUE
            FOR UPDATE
            "#,
        )
        .bind(owner_id)
        .fetch_all(&mut *tx)
        .await?;

        if active.len() >= MAX_ACTIVE_CLAIMS {
            return Err(AppError::ClaimLimitExceeded);
        }

        let row = sqlx::query_as::<_, BlockClaimRow>(&format!(
            r#"
            INSERT INTO block_claims (id, owner_id, lng, lat, radius_miles, active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(center.lng)
        .bind(center.lat)
        .bind(radius_miles)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn deactivate_block_claim(&self, owner_id: Uuid, claim_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE block_claims
            SET active = FALSE, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND active = TRUE
            "#,
        )
        .bind(claim_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn newest_active_claim(&self, owner_id: Uuid) -> Result<Option<BlockClaim>> {
        let row = sqlx::query_as::<_, BlockClaimRow>(&format!(
            r#"
            SELECT {CLAIM_COLUMNS}
            FROM block_claims
            WHERE owner_id = $1 AND active = TRUE
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BlockClaim::try_from).transpose()
    }

    async fn claims_for(&self, owner_id: Uuid) -> Result<Vec<BlockClaim>> {
        let rows = sqlx::query_as::<_, BlockClaimRow>(&format!(
            r#"
            SELECT {CLAIM_COLUMNS}
            FROM block_claims
            WHERE owner_id = $1
            ORDER BY updated_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BlockClaim::try_from).collect()
    }

    async fn insert_address(&self, location: Point) -> Result<Address> {
        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO addresses (id, lng, lat)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(location.lng)
        .bind(location.lat)
        .fetch_one(&self.pool)
        .await?;

        Ok(Address {
            id,
            location,
            created_at,
        })
    }

    async fn insert_address_claim(
        &self,
        owner_id: Uuid,
        address_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<AddressClaim> {
        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO address_claims (id, owner_id, address_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(address_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(AddressClaim {
            id,
            address_id,
            owner_id,
            expires_at,
            created_at,
        })
    }

    async fn current_address_claim(&self, owner_id: Uuid) -> Result<Option<AddressClaim>> {
        let claim = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, address_id, expires_at, created_at
            FROM address_claims
            WHERE owner_id = $1 AND expires_at > NOW()
            ORDER BY expires_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(claim.map(|(id, address_id, expires_at, created_at)| AddressClaim {
            id,
            address_id,
            owner_id,
            expires_at,
            created_at,
        }))
    }
}
