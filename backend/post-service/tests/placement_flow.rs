//! Service-level placement scenarios: category gating, the live tether,
//! claim containment, duration bounds, and idempotent persistence.
mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use geo_core::{wkt, Point};
use uuid::Uuid;

use post_service::error::AppError;
use post_service::models::{CreatePostRequest, ItemKind, LiveFixPayload, PostCategory};
use post_service::services::{ClaimService, PostingService};

use support::{downtown, north_of, InMemoryClaimStore, InMemoryPostStore};

struct Harness {
    posts: Arc<InMemoryPostStore>,
    claims: ClaimService,
    posting: PostingService,
    author: Uuid,
}

fn harness() -> Harness {
    let posts = Arc::new(InMemoryPostStore::default());
    let claim_store = Arc::new(InMemoryClaimStore::default());
    let claims = ClaimService::new(claim_store);
    let posting = PostingService::new(posts.clone(), claims.clone());

    Harness {
        posts,
        claims,
        posting,
        author: Uuid::new_v4(),
    }
}

fn fresh_fix(point: Point) -> LiveFixPayload {
    LiveFixPayload {
        lng: point.lng,
        lat: point.lat,
        captured_at: Utc::now(),
    }
}

fn request(category: PostCategory, pin: Point, duration_minutes: i64) -> CreatePostRequest {
    CreatePostRequest {
        category,
        item_kind: None,
        content: "around the corner".into(),
        geometry: wkt::to_ewkt(pin),
        duration_minutes,
        idempotency_key: Uuid::new_v4().to_string(),
        live_fix: None,
    }
}

#[tokio::test]
async fn activity_without_claim_is_trust_required() {
    let h = harness();
    let mut req = request(PostCategory::Activity, downtown(), 60);
    // A fix right on the pin makes no difference for trusted categories.
    req.live_fix = Some(fresh_fix(downtown()));

    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::TrustRequired));
    assert!(h.posts.posts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn status_near_live_fix_posts_for_an_hour() {
    let h = harness();
    let pin = downtown();
    let mut req = request(PostCategory::Status, pin, 60);
    req.live_fix = Some(fresh_fix(north_of(pin, 0.5)));

    let before = Utc::now();
    let post = h.posting.create_post(h.author, req).await.unwrap();

    let lifetime = post.expires_at - before;
    assert!(lifetime >= Duration::minutes(59) && lifetime <= Duration::minutes(61));
}

#[tokio::test]
async fn pin_outside_live_tether_is_rejected() {
    let h = harness();
    let pin = downtown();
    let mut req = request(PostCategory::Status, pin, 60);
    req.live_fix = Some(fresh_fix(north_of(pin, 1.5)));

    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::OutsideLiveRadius));
}

#[tokio::test]
async fn missing_fix_is_location_unavailable() {
    let h = harness();
    let req = request(PostCategory::Ask, downtown(), 60);

    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::LocationUnavailable));
}

#[tokio::test]
async fn stale_fix_is_location_unavailable() {
    let h = harness();
    let pin = downtown();
    let mut req = request(PostCategory::Status, pin, 60);
    req.live_fix = Some(LiveFixPayload {
        lng: pin.lng,
        lat: pin.lat,
        captured_at: Utc::now() - Duration::seconds(20),
    });

    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::LocationUnavailable));
}

#[tokio::test]
async fn claim_holder_posts_day_long_status_inside_radius() {
    let h = harness();
    let center = downtown();
    h.claims
        .create_block_claim(h.author, center, 2.0)
        .await
        .unwrap();

    let req = request(PostCategory::Status, north_of(center, 1.8), 1440);
    let before = Utc::now();
    let post = h.posting.create_post(h.author, req).await.unwrap();

    let lifetime = post.expires_at - before;
    assert!(lifetime >= Duration::minutes(1439) && lifetime <= Duration::minutes(1441));
}

#[tokio::test]
async fn claim_holder_pin_beyond_radius_is_rejected() {
    let h = harness();
    let center = downtown();
    h.claims
        .create_block_claim(h.author, center, 2.0)
        .await
        .unwrap();

    let req = request(PostCategory::Status, north_of(center, 2.2), 1440);
    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::OutsideClaimRadius));
}

#[tokio::test]
async fn physical_item_duration_bounds_are_inclusive() {
    let h = harness();
    let center = downtown();
    h.claims
        .create_block_claim(h.author, center, 2.0)
        .await
        .unwrap();

    let mut accepted = request(PostCategory::Item, center, 20_000);
    accepted.item_kind = Some(ItemKind::Physical);
    assert!(h.posting.create_post(h.author, accepted).await.is_ok());

    let mut rejected = request(PostCategory::Item, center, 50_000);
    rejected.item_kind = Some(ItemKind::Physical);
    let err = h.posting.create_post(h.author, rejected).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn fixed_duration_rejects_other_choices() {
    let h = harness();
    let pin = downtown();
    let mut req = request(PostCategory::Status, pin, 120);
    req.live_fix = Some(fresh_fix(pin));

    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn item_without_kind_is_rejected() {
    let h = harness();
    h.claims
        .create_block_claim(h.author, downtown(), 2.0)
        .await
        .unwrap();

    let req = request(PostCategory::Item, downtown(), 1440);
    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn empty_content_is_rejected() {
    let h = harness();
    let pin = downtown();
    let mut req = request(PostCategory::Status, pin, 60);
    req.content = String::new();
    req.live_fix = Some(fresh_fix(pin));

    let err = h.posting.create_post(h.author, req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn retried_submission_applies_once() {
    let h = harness();
    let pin = downtown();
    let mut req = request(PostCategory::Status, pin, 60);
    req.live_fix = Some(fresh_fix(pin));

    let first = h.posting.create_post(h.author, req.clone()).await.unwrap();

    // Same idempotency key, fresh fix: the retry lands on the same row.
    req.live_fix = Some(fresh_fix(pin));
    let second = h.posting.create_post(h.author, req).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(h.posts.posts.lock().unwrap().len(), 1);
}
