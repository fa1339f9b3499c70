/// Store traits and their Postgres implementations
///
/// The engine talks to a generic row store: single-row inserts/updates,
/// predicate selects, and one bounded-box spatial query. The traits keep
/// the services testable against in-memory implementations; the Postgres
/// types are the production store.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo_core::Point;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Address, AddressClaim, BlockClaim, NewPost, Post, Presence};
use crate::services::feed::BoundsQuery;

mod claims;
mod posts;
mod presence;

pub use claims::PgClaimStore;
pub use posts::PgPostStore;
pub use presence::PgPresenceStore;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a post, or return the already-persisted row carrying the
    /// same idempotency key (retried submissions apply at most once).
    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    /// Posts inside the bounding box, newest first.
    async fn posts_in_bounds(&self, query: &BoundsQuery) -> Result<Vec<Post>>;
}

#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Insert an active block claim. Implementations enforce the
    /// active-claims-per-owner cap atomically and fail with
    /// `ClaimLimitExceeded` when it would be crossed.
    async fn insert_block_claim(
        &self,
        owner_id: Uuid,
        center: Point,
        radius_miles: f64,
    ) -> Result<BlockClaim>;

    /// Soft-release a claim. A no-op when the claim is already inactive,
    /// unknown, or owned by someone else.
    async fn deactivate_block_claim(&self, owner_id: Uuid, claim_id: Uuid) -> Result<()>;

    /// The owner's active claim with the most recent `updated_at`.
    async fn newest_active_claim(&self, owner_id: Uuid) -> Result<Option<BlockClaim>>;

    /// All of the owner's claims, newest-updated first.
    async fn claims_for(&self, owner_id: Uuid) -> Result<Vec<BlockClaim>>;

    async fn insert_address(&self, location: Point) -> Result<Address>;

    async fn insert_address_claim(
        &self,
        owner_id: Uuid,
        address_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<AddressClaim>;

    /// The owner's unexpired address claim with the latest `expires_at`.
    async fn current_address_claim(&self, owner_id: Uuid) -> Result<Option<AddressClaim>>;
}

#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Insert or refresh the caller's last-known location.
    async fn upsert_presence(&self, user_id: Uuid, location: Point) -> Result<Presence>;
}
