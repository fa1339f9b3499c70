/// Placement authorization
///
/// One pure decision collapses every posting rule: category gating,
/// claim-radius containment, the live-location tether, and the visibility
/// duration bounds. Callers persist nothing unless the decision is
/// `Accepted`.
use chrono::{DateTime, Duration, Utc};
use geo_core::{distance_miles, Point};

use crate::error::AppError;
use crate::models::{ItemKind, PostCategory};

/// Fixed tether between a non-claimed poster's live fix and their pin,
/// statute miles. Distinct from any claim radius.
pub const LIVE_TETHER_MILES: f64 = 1.0;

/// Oldest device fix accepted as fresh, seconds. Matches the cache
/// tolerance the map clients pass to the geolocation API.
pub const LIVE_FIX_MAX_AGE_SECS: i64 = 15;

/// Whether a category is postable by anyone nearby or needs a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Open,
    Trusted,
}

pub fn category_group(category: PostCategory) -> CategoryGroup {
    match category {
        PostCategory::Status | PostCategory::Ask => CategoryGroup::Open,
        PostCategory::Activity | PostCategory::Item => CategoryGroup::Trusted,
    }
}

/// Inclusive visibility-duration bounds in minutes. `min == max` means the
/// duration is not user-selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl DurationRange {
    pub const fn fixed(minutes: i64) -> Self {
        Self {
            min_minutes: minutes,
            max_minutes: minutes,
        }
    }

    pub const fn bounded(min_minutes: i64, max_minutes: i64) -> Self {
        Self {
            min_minutes,
            max_minutes,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.min_minutes == self.max_minutes
    }

    pub fn contains(&self, minutes: i64) -> bool {
        (self.min_minutes..=self.max_minutes).contains(&minutes)
    }
}

/// Visibility-duration bounds for `(category, item_kind, claimed)`.
///
/// An `item` post with no kind is priced as food, mirroring the
/// composer's default selection.
pub fn duration_range(
    category: PostCategory,
    item_kind: Option<ItemKind>,
    has_claim: bool,
) -> DurationRange {
    match category {
        PostCategory::Status => {
            if has_claim {
                DurationRange::fixed(1440)
            } else {
                DurationRange::fixed(60)
            }
        }
        PostCategory::Ask => {
            if has_claim {
                DurationRange::bounded(60, 10080)
            } else {
                DurationRange::fixed(60)
            }
        }
        PostCategory::Activity => DurationRange::bounded(60, 10080),
        PostCategory::Item => match item_kind {
            Some(ItemKind::Physical) => DurationRange::bounded(1440, 43200),
            _ => DurationRange::fixed(1440),
        },
    }
}

/// The poster's active block claim, reduced to what placement needs.
#[derive(Debug, Clone, Copy)]
pub struct ClaimArea {
    pub center: Point,
    pub radius_miles: f64,
}

/// A validated device fix with its capture time.
#[derive(Debug, Clone, Copy)]
pub struct LiveFix {
    pub point: Point,
    pub captured_at: DateTime<Utc>,
}

impl LiveFix {
    pub fn fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.captured_at <= Duration::seconds(LIVE_FIX_MAX_AGE_SECS)
    }
}

/// Everything the decision reads.
#[derive(Debug, Clone)]
pub struct PlacementRequest {
    pub category: PostCategory,
    pub item_kind: Option<ItemKind>,
    pub pin: Point,
    pub claim: Option<ClaimArea>,
    pub live_fix: Option<LiveFix>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    TrustRequired,
    OutsideClaimRadius,
    OutsideLiveRadius,
    LocationUnavailable,
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::TrustRequired => AppError::TrustRequired,
            DenyReason::OutsideClaimRadius => AppError::OutsideClaimRadius,
            DenyReason::OutsideLiveRadius => AppError::OutsideLiveRadius,
            DenyReason::LocationUnavailable => AppError::LocationUnavailable,
        }
    }
}

/// Outcome of validating a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementDecision {
    Accepted { duration: DurationRange },
    Rejected { reason: DenyReason },
}

impl PlacementDecision {
    fn accept(request: &PlacementRequest) -> Self {
        PlacementDecision::Accepted {
            duration: duration_range(
                request.category,
                request.item_kind,
                request.claim.is_some(),
            ),
        }
    }

    fn reject(reason: DenyReason) -> Self {
        PlacementDecision::Rejected { reason }
    }
}

/// Decide whether the pin is legal and which duration bounds apply.
///
/// A claim holder passes on claim containment alone; only claimless open
/// posts fall back to the live-location tether.
pub fn evaluate(request: &PlacementRequest, now: DateTime<Utc>) -> PlacementDecision {
    match (category_group(request.category), request.claim) {
        (CategoryGroup::Trusted, None) => PlacementDecision::reject(DenyReason::TrustRequired),
        (_, Some(claim)) => {
            if distance_miles(request.pin, claim.center) <= claim.radius_miles {
                PlacementDecision::accept(request)
            } else {
                PlacementDecision::reject(DenyReason::OutsideClaimRadius)
            }
        }
        (CategoryGroup::Open, None) => {
            let Some(fix) = request.live_fix else {
                return PlacementDecision::reject(DenyReason::LocationUnavailable);
            };
            if !fix.fresh_at(now) {
                return PlacementDecision::reject(DenyReason::LocationUnavailable);
            }
            if distance_miles(request.pin, fix.point) <= LIVE_TETHER_MILES {
                PlacementDecision::accept(request)
            } else {
                PlacementDecision::reject(DenyReason::OutsideLiveRadius)
            }
        }
    }
}
