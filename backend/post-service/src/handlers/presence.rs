/// Presence endpoint
use actix_web::{put, web, HttpResponse};
use geo_core::wkt;

use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::PresenceRequest;
use crate::services::PresenceService;

/// Report the caller's current location
///
/// **Endpoint**: `PUT /presence`
#[put("/presence")]
pub async fn update_presence(
    presence: web::Data<PresenceService>,
    user: User,
    request: web::Json<PresenceRequest>,
) -> Result<HttpResponse, AppError> {
    let location = wkt::parse_point(&request.geometry).ok_or_else(|| {
        AppError::Validation("geometry must be a SRID=4326;POINT(lng lat) literal".into())
    })?;

    let presence = presence.report(user.id, location).await?;

    Ok(HttpResponse::Ok().json(presence))
}
