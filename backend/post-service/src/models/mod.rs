use chrono::{DateTime, Utc};
use geo_core::{circle_polygon, wkt, Point, DEFAULT_CIRCLE_STEPS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Post category. `status` and `ask` are open to any nearby user;
/// `activity` and `item` require an active block claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Status,
    Ask,
    Activity,
    Item,
}

impl PostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Status => "status",
            PostCategory::Ask => "ask",
            PostCategory::Activity => "activity",
            PostCategory::Item => "item",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "status" => Some(PostCategory::Status),
            "ask" => Some(PostCategory::Ask),
            "activity" => Some(PostCategory::Activity),
            "item" => Some(PostCategory::Item),
            _ => None,
        }
    }
}

/// Kind qualifier for `item` posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Food,
    Physical,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Food => "food",
            ItemKind::Physical => "physical",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "food" => Some(ItemKind::Food),
            "physical" => Some(ItemKind::Physical),
            _ => None,
        }
    }
}

/// Post entity - an ephemeral pin on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category: PostCategory,
    pub item_kind: Option<ItemKind>,
    pub content: String,
    pub location: Point,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub idempotency_key: String,
    pub report_count: i32,
    pub hidden: bool,
}

impl Post {
    /// Whether the post should still appear on the map at `now`.
    pub fn visible_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at && !self.hidden
    }
}

/// Fields the posting flow persists for an accepted post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub category: PostCategory,
    pub item_kind: Option<ItemKind>,
    pub content: String,
    pub location: Point,
    pub expires_at: DateTime<Utc>,
    pub idempotency_key: String,
}

/// BlockClaim entity - a user-owned circular trust region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockClaim {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub center: Point,
    pub radius_miles: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address entity - the anchor point for an address claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub location: Point,
    pub created_at: DateTime<Utc>,
}

/// AddressClaim entity - a point-anchored, time-limited trust grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressClaim {
    pub id: Uuid,
    pub address_id: Uuid,
    pub owner_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Presence entity - a user's last reported location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presence {
    pub user_id: Uuid,
    pub location: Point,
    pub updated_at: DateTime<Utc>,
}

/// Axis-aligned geographic bounding box (map viewport).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub south_west: Point,
    pub north_east: Point,
}

// ============================================================================
// API request/response types
// ============================================================================

/// API Request: create a post
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(rename = "post_type")]
    pub category: PostCategory,
    pub item_kind: Option<ItemKind>,
    #[validate(length(min = 1, max = 2000, message = "content must be 1-2000 characters"))]
    pub content: String,
    /// Pin as `SRID=4326;POINT(lng lat)`
    pub geometry: String,
    pub duration_minutes: i64,
    #[validate(length(min = 8, max = 128, message = "idempotency_key must be 8-128 characters"))]
    pub idempotency_key: String,
    /// Fresh device fix; required when the poster holds no active claim.
    pub live_fix: Option<LiveFixPayload>,
}

/// A device geolocation reading as reported by the client.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LiveFixPayload {
    pub lng: f64,
    pub lat: f64,
    pub captured_at: DateTime<Utc>,
}

/// API Response: post
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub post_type: PostCategory,
    pub item_kind: Option<ItemKind>,
    pub content: String,
    pub geometry: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            post_type: post.category,
            item_kind: post.item_kind,
            content: post.content,
            geometry: wkt::to_ewkt(post.location),
            created_at: post.created_at,
            expires_at: post.expires_at,
        }
    }
}

/// API Request: create a block claim
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlockClaimRequest {
    /// Center as `SRID=4326;POINT(lng lat)`
    pub geometry: String,
    pub radius_miles: f64,
}

/// API Response: block claim
#[derive(Debug, Serialize)]
pub struct BlockClaimResponse {
    pub id: Uuid,
    pub center: String,
    pub radius_miles: f64,
    pub active: bool,
    /// Closed ring approximating the claim disk, `[lng, lat]` pairs,
    /// ready to render as a polygon feature.
    pub ring: Vec<[f64; 2]>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlockClaim> for BlockClaimResponse {
    fn from(claim: BlockClaim) -> Self {
        let ring = circle_polygon(claim.center, claim.radius_miles, DEFAULT_CIRCLE_STEPS)
            .into_iter()
            .map(|point| [point.lng, point.lat])
            .collect();

        Self {
            id: claim.id,
            center: wkt::to_ewkt(claim.center),
            radius_miles: claim.radius_miles,
            active: claim.active,
            ring,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

/// API Request: claim the address at a point
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimAddressRequest {
    /// Anchor as `SRID=4326;POINT(lng lat)`
    pub geometry: String,
}

/// API Response: address claim
#[derive(Debug, Serialize)]
pub struct AddressClaimResponse {
    pub id: Uuid,
    pub address_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<AddressClaim> for AddressClaimResponse {
    fn from(claim: AddressClaim) -> Self {
        Self {
            id: claim.id,
            address_id: claim.address_id,
            expires_at: claim.expires_at,
        }
    }
}

/// API Request: report current location
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceRequest {
    /// Location as `SRID=4326;POINT(lng lat)`
    pub geometry: String,
}
