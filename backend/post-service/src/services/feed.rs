/// Feed window
///
/// Translates a map viewport into the bounded spatial query and
/// re-filters the result locally by category and visibility. There is no
/// caching of stale windows: every bounds change is a fresh query, and a
/// fetch that loses the race to a newer viewport is discarded.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{MapBounds, Post, PostCategory};
use crate::repository::PostStore;

/// Bounding-box parameters for the spatial fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsQuery {
    pub sw_lng: f64,
    pub sw_lat: f64,
    pub ne_lng: f64,
    pub ne_lat: f64,
}

/// Validate a viewport into query parameters. Inverted or degenerate
/// boxes never reach the store.
pub fn bounds_query(bounds: &MapBounds) -> Result<BoundsQuery> {
    let sw = bounds.south_west;
    let ne = bounds.north_east;

    if sw.lng >= ne.lng || sw.lat >= ne.lat {
        return Err(AppError::InvalidBounds);
    }

    Ok(BoundsQuery {
        sw_lng: sw.lng,
        sw_lat: sw.lat,
        ne_lng: ne.lng,
        ne_lat: ne.lat,
    })
}

/// Keep only posts whose category is in the active set; an empty set
/// means no filtering. Ordering is preserved.
pub fn apply_category_filter(posts: Vec<Post>, active: &[PostCategory]) -> Vec<Post> {
    if active.is_empty() {
        return posts;
    }

    posts
        .into_iter()
        .filter(|post| active.contains(&post.category))
        .collect()
}

/// Drop expired and hidden posts. The store filters these too, but the
/// store is the source of truth for visibility and a row can expire
/// between the query and the render.
pub fn visible_posts(posts: Vec<Post>, now: chrono::DateTime<Utc>) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| post.visible_at(now))
        .collect()
}

/// Per-viewer fetch ticket; see [`FeedWindow`].
#[derive(Debug, Clone, Copy)]
pub struct WindowTicket {
    viewer_id: Uuid,
    generation: u64,
}

/// Tracks the newest viewport per viewer. Each fetch takes a ticket; a
/// ticket superseded by a later one is stale, and its result must be
/// discarded rather than applied (last request wins).
#[derive(Default)]
pub struct FeedWindow {
    generations: Mutex<HashMap<Uuid, Arc<AtomicU64>>>,
}

impl FeedWindow {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, viewer_id: Uuid) -> Arc<AtomicU64> {
        let mut generations = self.generations.lock().unwrap();
        generations.entry(viewer_id).or_default().clone()
    }

    /// Register a new fetch for this viewer, superseding earlier ones.
    pub fn begin(&self, viewer_id: Uuid) -> WindowTicket {
        let generation = self.counter(viewer_id).fetch_add(1, Ordering::SeqCst) + 1;
        WindowTicket {
            viewer_id,
            generation,
        }
    }

    /// Whether the ticket still names the viewer's newest fetch.
    pub fn is_current(&self, ticket: &WindowTicket) -> bool {
        self.counter(ticket.viewer_id).load(Ordering::SeqCst) == ticket.generation
    }
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn PostStore>,
    window: Arc<FeedWindow>,
}

impl FeedService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            window: Arc::new(FeedWindow::new()),
        }
    }

    /// Posts visible in the viewport, category-filtered. `None` means the
    /// fetch was superseded by a newer viewport for the same viewer and
    /// its result was discarded.
    pub async fn posts_in_window(
        &self,
        viewer_id: Uuid,
        bounds: &MapBounds,
        active_categories: &[PostCategory],
    ) -> Result<Option<Vec<Post>>> {
        let query = bounds_query(bounds)?;
        let ticket = self.window.begin(viewer_id);

        let posts = self.store.posts_in_bounds(&query).await?;

        if !self.window.is_current(&ticket) {
            tracing::debug!(viewer_id = %viewer_id, "viewport superseded, discarding fetch");
            return Ok(None);
        }

        let posts = visible_posts(posts, Utc::now());
        Ok(Some(apply_category_filter(posts, active_categories)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use geo_core::Point;

    fn bounds(sw: (f64, f64), ne: (f64, f64)) -> MapBounds {
        MapBounds {
            south_west: Point::new(sw.0, sw.1).unwrap(),
            north_east: Point::new(ne.0, ne.1).unwrap(),
        }
    }

    fn post(category: PostCategory, content: &str) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            category,
            item_kind: None,
            content: content.into(),
            location: Point::new(-112.074, 33.4484).unwrap(),
            created_at: now,
            expires_at: now + Duration::hours(1),
            idempotency_key: Uuid::new_v4().to_string(),
            report_count: 0,
            hidden: false,
        }
    }

    #[test]
    fn test_bounds_query_passthrough() {
        let query = bounds_query(&bounds((-112.1, 33.4), (-112.0, 33.5))).unwrap();
        assert_eq!(query.sw_lng, -112.1);
        assert_eq!(query.ne_lat, 33.5);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = bounds_query(&bounds((-112.0, 33.5), (-112.1, 33.4)));
        assert!(matches!(result, Err(AppError::InvalidBounds)));
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let result = bounds_query(&bounds((-112.1, 33.4), (-112.1, 33.5)));
        assert!(matches!(result, Err(AppError::InvalidBounds)));
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() {
        let posts = vec![
            post(PostCategory::Status, "a"),
            post(PostCategory::Item, "b"),
            post(PostCategory::Ask, "c"),
        ];
        let contents: Vec<String> = posts.iter().map(|p| p.content.clone()).collect();

        let filtered = apply_category_filter(posts, &[]);
        let after: Vec<String> = filtered.iter().map(|p| p.content.clone()).collect();
        assert_eq!(after, contents);
    }

    #[test]
    fn test_category_filter_is_stable() {
        let posts = vec![
            post(PostCategory::Status, "a"),
            post(PostCategory::Item, "b"),
            post(PostCategory::Status, "c"),
            post(PostCategory::Ask, "d"),
        ];

        let filtered =
            apply_category_filter(posts, &[PostCategory::Status, PostCategory::Ask]);
        let contents: Vec<&str> = filtered.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_visibility_refilter() {
        let now = Utc::now();
        let mut expired = post(PostCategory::Status, "expired");
        expired.expires_at = now - Duration::minutes(1);
        let mut hidden = post(PostCategory::Status, "hidden");
        hidden.hidden = true;
        let fresh = post(PostCategory::Status, "fresh");

        let visible = visible_posts(vec![expired, hidden, fresh], now);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].content, "fresh");
    }

    #[test]
    fn test_superseded_ticket_is_stale() {
        let window = FeedWindow::new();
        let viewer = Uuid::new_v4();

        let first = window.begin(viewer);
        assert!(window.is_current(&first));

        let second = window.begin(viewer);
        assert!(!window.is_current(&first));
        assert!(window.is_current(&second));
    }

    #[test]
    fn test_viewers_do_not_supersede_each_other() {
        let window = FeedWindow::new();
        let alice = window.begin(Uuid::new_v4());
        let bob = window.begin(Uuid::new_v4());

        assert!(window.is_current(&alice));
        assert!(window.is_current(&bob));
    }
}
