/// Post Service Library
///
/// Hosts the proximity-and-trust posting engine for Stoop: placement
/// authorization for pinned posts, block/address claim lifecycle, the
/// bounded feed window, and presence upserts.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Posts, claims, presence, and their request/response types
/// - `services`: Placement policy, claim engine, feed window, posting flow
/// - `repository`: Store traits and their Postgres implementations
/// - `middleware`: Request guards (gateway-asserted identity)
/// - `error`: Error taxonomy and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
