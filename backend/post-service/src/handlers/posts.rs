/// Posting and feed endpoints
use actix_web::{get, post, web, HttpResponse};
use geo_core::Point;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::{CreatePostRequest, MapBounds, PostCategory, PostResponse};
use crate::services::{FeedService, PostingService};

/// Create a post at a pinned location
///
/// The pin must pass placement authorization: trusted categories need an
/// active block claim containing the pin, open categories need either a
/// claim or a fresh device fix within the live tether.
///
/// **Endpoint**: `POST /posts`
#[post("/posts")]
pub async fn create_post(
    posting: web::Data<PostingService>,
    user: User,
    request: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let post = posting.create_post(user.id, request.into_inner()).await?;

    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub sw_lng: f64,
    pub sw_lat: f64,
    pub ne_lng: f64,
    pub ne_lat: f64,
    /// Comma-separated category slugs; absent or empty means all.
    pub categories: Option<String>,
}

/// Posts visible in a viewport
///
/// Returns 204 when the fetch was superseded by a newer viewport from the
/// same caller (the client should keep whatever it rendered last).
///
/// **Endpoint**: `GET /posts`
#[get("/posts")]
pub async fn posts_in_bounds(
    feed: web::Data<FeedService>,
    user: User,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, AppError> {
    let bounds = MapBounds {
        south_west: Point::new(query.sw_lng, query.sw_lat)?,
        north_east: Point::new(query.ne_lng, query.ne_lat)?,
    };
    let categories = parse_categories(query.categories.as_deref())?;

    match feed.posts_in_window(user.id, &bounds, &categories).await? {
        Some(posts) => Ok(HttpResponse::Ok().json(
            posts
                .into_iter()
                .map(PostResponse::from)
                .collect::<Vec<_>>(),
        )),
        None => Ok(HttpResponse::NoContent().finish()),
    }
}

fn parse_categories(raw: Option<&str>) -> Result<Vec<PostCategory>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(|slug| {
            PostCategory::from_slug(slug)
                .ok_or_else(|| AppError::Validation(format!("unknown category '{}'", slug)))
        })
        .collect()
}
