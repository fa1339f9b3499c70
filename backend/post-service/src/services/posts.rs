/// Posting flow
///
/// Runs a create-post request through placement authorization and, on
/// acceptance, persists it. The insert carries the caller's idempotency
/// key, so a retry after an ambiguous network failure lands on the same
/// row instead of duplicating the post.
use std::sync::Arc;

use chrono::{Duration, Utc};
use geo_core::{wkt, Point};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{CreatePostRequest, NewPost, Post, PostCategory};
use crate::repository::PostStore;
use crate::services::claims::ClaimService;
use crate::services::placement::{
    self, ClaimArea, LiveFix, PlacementDecision, PlacementRequest,
};

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn PostStore>,
    claims: ClaimService,
}

impl PostingService {
    pub fn new(store: Arc<dyn PostStore>, claims: ClaimService) -> Self {
        Self { store, claims }
    }

    pub async fn create_post(&self, author_id: Uuid, request: CreatePostRequest) -> Result<Post> {
        request
            .validate()
            .map_err(|err| AppError::Validation(err.to_string()))?;

        if request.category == PostCategory::Item && request.item_kind.is_none() {
            return Err(AppError::Validation(
                "item_kind is required for item posts".into(),
            ));
        }

        let content = request.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("content must not be blank".into()));
        }

        let pin = wkt::parse_point(&request.geometry).ok_or_else(|| {
            AppError::Validation("geometry must be a SRID=4326;POINT(lng lat) literal".into())
        })?;

        let claim = self
            .claims
            .active_claim_for(author_id)
            .await?
            .map(|claim| ClaimArea {
                center: claim.center,
                radius_miles: claim.radius_miles,
            });

        let live_fix = match request.live_fix {
            Some(fix) => Some(LiveFix {
                point: Point::new(fix.lng, fix.lat)?,
                captured_at: fix.captured_at,
            }),
            None => None,
        };

        let now = Utc::now();
        let placement = PlacementRequest {
            category: request.category,
            item_kind: request.item_kind,
            pin,
            claim,
            live_fix,
        };

        let duration = match placement::evaluate(&placement, now) {
            PlacementDecision::Rejected { reason } => {
                tracing::info!(author_id = %author_id, category = request.category.as_str(), ?reason, "post rejected");
                return Err(reason.into());
            }
            PlacementDecision::Accepted { duration } => duration,
        };

        if !duration.contains(request.duration_minutes) {
            return Err(AppError::Validation(format!(
                "duration must be between {} and {} minutes",
                duration.min_minutes, duration.max_minutes
            )));
        }

        let post = self
            .store
            .insert_post(NewPost {
                author_id,
                category: request.category,
                item_kind: request.item_kind,
                content: content.to_string(),
                location: pin,
                expires_at: now + Duration::minutes(request.duration_minutes),
                idempotency_key: request.idempotency_key,
            })
            .await?;

        tracing::info!(post_id = %post.id, category = post.category.as_str(), "post created");
        Ok(post)
    }
}
