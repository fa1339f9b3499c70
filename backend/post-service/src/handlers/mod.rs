/// HTTP request handlers
pub mod claims;
pub mod posts;
pub mod presence;

use actix_web::{web, HttpResponse, Responder};

/// Liveness probe
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "post-service",
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(posts::create_post)
        .service(posts::posts_in_bounds)
        .service(claims::create_block_claim)
        .service(claims::list_block_claims)
        .service(claims::deactivate_block_claim)
        .service(claims::claim_address)
        .service(claims::current_address_claim)
        .service(presence::update_presence)
        .route("/health", web::get().to(health));
}
