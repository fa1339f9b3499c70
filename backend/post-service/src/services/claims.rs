/// Claim lifecycle
///
/// Block claims are circular trust regions (center + 1-3 mile radius)
/// granting elevated posting rights inside them; address claims are the
/// legacy point-anchored grant with a fixed expiry. Claims are created
/// active and soft-released, never hard-deleted.
use std::sync::Arc;

use chrono::{Duration, Utc};
use geo_core::Point;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Address, AddressClaim, BlockClaim};
use crate::repository::ClaimStore;

/// Claim radius bounds, statute miles.
pub const MIN_CLAIM_RADIUS_MILES: f64 = 1.0;
pub const MAX_CLAIM_RADIUS_MILES: f64 = 3.0;

/// Active block claims allowed per owner. Enforced in the store under a
/// transaction; the settings screen merely repeats it as copy.
pub const MAX_ACTIVE_CLAIMS: usize = 3;

/// Address claims expire this many days after creation.
pub const ADDRESS_CLAIM_TTL_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ClaimService {
    store: Arc<dyn ClaimStore>,
}

impl ClaimService {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Create an active block claim for the owner.
    pub async fn create_block_claim(
        &self,
        owner_id: Uuid,
        center: Point,
        radius_miles: f64,
    ) -> Result<BlockClaim> {
        if !(MIN_CLAIM_RADIUS_MILES..=MAX_CLAIM_RADIUS_MILES).contains(&radius_miles) {
            return Err(AppError::InvalidRadius);
        }

        let claim = self
            .store
            .insert_block_claim(owner_id, center, radius_miles)
            .await?;

        tracing::info!(claim_id = %claim.id, owner_id = %owner_id, radius_miles, "block claim created");
        Ok(claim)
    }

    /// Soft-release a claim. Releasing an already-inactive or unknown
    /// claim is a no-op.
    pub async fn deactivate_claim(&self, owner_id: Uuid, claim_id: Uuid) -> Result<()> {
        self.store.deactivate_block_claim(owner_id, claim_id).await
    }

    /// The claim that currently grants the owner trust, if any. When
    /// several are active the most recently updated one wins.
    pub async fn active_claim_for(&self, owner_id: Uuid) -> Result<Option<BlockClaim>> {
        self.store.newest_active_claim(owner_id).await
    }

    /// All of the owner's claims, newest-updated first.
    pub async fn claims_for(&self, owner_id: Uuid) -> Result<Vec<BlockClaim>> {
        self.store.claims_for(owner_id).await
    }

    /// Claim the address at a point: inserts the address, then a claim
    /// expiring in [`ADDRESS_CLAIM_TTL_DAYS`]. The two inserts are
    /// separate store calls; when the second fails the returned error
    /// names the address row that may now be orphaned so the caller can
    /// compensate.
    pub async fn claim_address(
        &self,
        owner_id: Uuid,
        location: Point,
    ) -> Result<(Address, AddressClaim)> {
        let address = self.store.insert_address(location).await?;
        let expires_at = Utc::now() + Duration::days(ADDRESS_CLAIM_TTL_DAYS);

        match self
            .store
            .insert_address_claim(owner_id, address.id, expires_at)
            .await
        {
            Ok(claim) => Ok((address, claim)),
            Err(err) => {
                tracing::warn!(address_id = %address.id, "address claim failed after address insert: {}", err);
                Err(AppError::ClaimIncomplete {
                    address_id: address.id,
                })
            }
        }
    }

    /// The owner's current address claim: latest still-unexpired
    /// `expires_at` wins; superseded claims are never revoked.
    pub async fn current_address_claim(&self, owner_id: Uuid) -> Result<Option<AddressClaim>> {
        self.store.current_address_claim(owner_id).await
    }
}
