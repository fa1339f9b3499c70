/// Claim endpoints
use actix_web::{delete, get, post, web, HttpResponse};
use geo_core::wkt;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::{
    AddressClaimResponse, BlockClaimResponse, ClaimAddressRequest, CreateBlockClaimRequest,
};
use crate::services::ClaimService;

fn parse_geometry(literal: &str) -> Result<geo_core::Point, AppError> {
    wkt::parse_point(literal).ok_or_else(|| {
        AppError::Validation("geometry must be a SRID=4326;POINT(lng lat) literal".into())
    })
}

/// Claim a block: a circular trust region around a center point
///
/// **Endpoint**: `POST /claims/blocks`
#[post("/claims/blocks")]
pub async fn create_block_claim(
    claims: web::Data<ClaimService>,
    user: User,
    request: web::Json<CreateBlockClaimRequest>,
) -> Result<HttpResponse, AppError> {
    let center = parse_geometry(&request.geometry)?;
    let claim = claims
        .create_block_claim(user.id, center, request.radius_miles)
        .await?;

    Ok(HttpResponse::Created().json(BlockClaimResponse::from(claim)))
}

/// List the caller's block claims, newest-updated first
///
/// **Endpoint**: `GET /claims/blocks`
#[get("/claims/blocks")]
pub async fn list_block_claims(
    claims: web::Data<ClaimService>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let claims = claims.claims_for(user.id).await?;

    Ok(HttpResponse::Ok().json(
        claims
            .into_iter()
            .map(BlockClaimResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// Release a block claim; releasing twice is a no-op
///
/// **Endpoint**: `DELETE /claims/blocks/{claim_id}`
#[delete("/claims/blocks/{claim_id}")]
pub async fn deactivate_block_claim(
    claims: web::Data<ClaimService>,
    user: User,
    claim_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    claims
        .deactivate_claim(user.id, claim_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "released" })))
}

/// Claim the address at a point (30-day trust grant)
///
/// **Endpoint**: `POST /claims/address`
#[post("/claims/address")]
pub async fn claim_address(
    claims: web::Data<ClaimService>,
    user: User,
    request: web::Json<ClaimAddressRequest>,
) -> Result<HttpResponse, AppError> {
    let anchor = parse_geometry(&request.geometry)?;
    let (_, claim) = claims.claim_address(user.id, anchor).await?;

    Ok(HttpResponse::Created().json(AddressClaimResponse::from(claim)))
}

/// The caller's current (latest unexpired) address claim, or null
///
/// **Endpoint**: `GET /claims/address`
#[get("/claims/address")]
pub async fn current_address_claim(
    claims: web::Data<ClaimService>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let claim = claims.current_address_claim(user.id).await?;

    Ok(HttpResponse::Ok().json(claim.map(AddressClaimResponse::from)))
}
