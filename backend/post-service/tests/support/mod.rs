//! In-memory store implementations backing the service-level tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo_core::Point;
use uuid::Uuid;

use post_service::error::{AppError, Result};
use post_service::models::{Address, AddressClaim, BlockClaim, NewPost, Post, Presence};
use post_service::repository::{ClaimStore, PostStore, PresenceStore};
use post_service::services::claims::MAX_ACTIVE_CLAIMS;
use post_service::services::feed::BoundsQuery;

#[derive(Default)]
pub struct InMemoryPostStore {
    pub posts: Mutex<Vec<Post>>,
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert_post(&self, new: NewPost) -> Result<Post> {
        let mut posts = self.posts.lock().unwrap();

        if let Some(existing) = posts
            .iter()
            .find(|p| p.idempotency_key == new.idempotency_key)
        {
            return Ok(existing.clone());
        }

        let post = Post {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            category: new.category,
            item_kind: new.item_kind,
            content: new.content,
            location: new.location,
            created_at: Utc::now(),
            expires_at: new.expires_at,
            idempotency_key: new.idempotency_key,
            report_count: 0,
            hidden: false,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn posts_in_bounds(&self, query: &BoundsQuery) -> Result<Vec<Post>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .iter()
            .filter(|p| {
                p.location.lng > query.sw_lng
                    && p.location.lng < query.ne_lng
                    && p.location.lat > query.sw_lat
                    && p.location.lat < query.ne_lat
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryClaimStore {
    pub block_claims: Mutex<Vec<BlockClaim>>,
    pub addresses: Mutex<Vec<Address>>,
    pub address_claims: Mutex<Vec<AddressClaim>>,
    /// When set, the next address-claim insert fails (for exercising the
    /// compensable two-step).
    pub fail_address_claims: AtomicBool,
}

impl InMemoryClaimStore {
    /// Seed a claim with explicit flags and timestamps.
    pub fn push_block_claim(
        &self,
        owner_id: Uuid,
        center: Point,
        radius_miles: f64,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.block_claims.lock().unwrap().push(BlockClaim {
            id,
            owner_id,
            center,
            radius_miles,
            active,
            created_at: updated_at,
            updated_at,
        });
        id
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn insert_block_claim(
        &self,
        owner_id: Uuid,
        center: Point,
        radius_miles: f64,
    ) -> Result<BlockClaim> {
        let mut claims = self.block_claims.lock().unwrap();

        let active = claims
            .iter()
            .filter(|c| c.owner_id == owner_id && c.active)
            .count();
        if active >= MAX_ACTIVE_CLAIMS {
            return Err(AppError::ClaimLimitExceeded);
        }

        let now = Utc::now();
        let claim = BlockClaim {
            id: Uuid::new_v4(),
            owner_id,
            center,
            radius_miles,
            active: true,
            created_at: now,
            updated_at: now,
        };
        claims.push(claim.clone());
        Ok(claim)
    }

    async fn deactivate_block_claim(&self, owner_id: Uuid, claim_id: Uuid) -> Result<()> {
        let mut claims = self.block_claims.lock().unwrap();
        if let Some(claim) = claims
            .iter_mut()
            .find(|c| c.id == claim_id && c.owner_id == owner_id && c.active)
        {
            claim.active = false;
            claim.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn newest_active_claim(&self, owner_id: Uuid) -> Result<Option<BlockClaim>> {
        let claims = self.block_claims.lock().unwrap();
        Ok(claims
            .iter()
            .filter(|c| c.owner_id == owner_id && c.active)
            .max_by_key(|c| (c.updated_at, c.id))
            .cloned())
    }

    async fn claims_for(&self, owner_id: Uuid) -> Result<Vec<BlockClaim>> {
        let claims = self.block_claims.lock().unwrap();
        let mut owned: Vec<BlockClaim> = claims
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn insert_address(&self, location: Point) -> Result<Address> {
        let address = Address {
            id: Uuid::new_v4(),
            location,
            created_at: Utc::now(),
        };
        self.addresses.lock().unwrap().push(address.clone());
        Ok(address)
    }

    async fn insert_address_claim(
        &self,
        owner_id: Uuid,
        address_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<AddressClaim> {
        if self.fail_address_claims.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable("injected failure".into()));
        }

        let claim = AddressClaim {
            id: Uuid::new_v4(),
            address_id,
            owner_id,
            expires_at,
            created_at: Utc::now(),
        };
        self.address_claims.lock().unwrap().push(claim.clone());
        Ok(claim)
    }

    async fn current_address_claim(&self, owner_id: Uuid) -> Result<Option<AddressClaim>> {
        let now = Utc::now();
        let claims = self.address_claims.lock().unwrap();
        Ok(claims
            .iter()
            .filter(|c| c.owner_id == owner_id && c.expires_at > now)
            .max_by_key(|c| c.expires_at)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPresenceStore {
    pub entries: Mutex<HashMap<Uuid, Presence>>,
}

#[async_trait]
impl PresenceStore for InMemoryPresenceStore {
    async fn upsert_presence(&self, user_id: Uuid, location: Point) -> Result<Presence> {
        let presence = Presence {
            user_id,
            location,
            updated_at: Utc::now(),
        };
        self.entries
            .lock()
            .unwrap()
            .insert(user_id, presence.clone());
        Ok(presence)
    }
}

/// A point `miles` due north of `p`; exact under the haversine.
pub fn north_of(p: Point, miles: f64) -> Point {
    let d_lat = miles * 180.0 / (std::f64::consts::PI * geo_core::EARTH_RADIUS_MILES);
    Point::new(p.lng, p.lat + d_lat).unwrap()
}

pub fn downtown() -> Point {
    Point::new(-112.0740, 33.4484).unwrap()
}
