use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;

use post_service::config::Config;
use post_service::handlers;
use post_service::repository::{
    ClaimStore, PgClaimStore, PgPostStore, PgPresenceStore, PostStore, PresenceStore,
};
use post_service::services::{ClaimService, FeedService, PostingService, PresenceService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("🔧 Starting post-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "✅ Configuration loaded: env={}, http_port={}",
        config.app.env, config.app.http_port
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    info!("✅ Database pool ready");

    let post_store: Arc<dyn PostStore> = Arc::new(PgPostStore::new(pool.clone()));
    let claim_store: Arc<dyn ClaimStore> = Arc::new(PgClaimStore::new(pool.clone()));
    let presence_store: Arc<dyn PresenceStore> = Arc::new(PgPresenceStore::new(pool));

    let claim_service = ClaimService::new(claim_store);
    let posting_service = PostingService::new(post_store.clone(), claim_service.clone());
    let feed_service = FeedService::new(post_store);
    let presence_service = PresenceService::new(presence_store);

    let bind_addr = (config.app.host.clone(), config.app.http_port);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(claim_service.clone()))
            .app_data(web::Data::new(posting_service.clone()))
            .app_data(web::Data::new(feed_service.clone()))
            .app_data(web::Data::new(presence_service.clone()))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run();

    info!(
        "🚀 post-service listening on {}:{}",
        config.app.host, config.app.http_port
    );

    server.await.context("HTTP server terminated")?;

    Ok(())
}
