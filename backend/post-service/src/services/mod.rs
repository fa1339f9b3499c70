pub mod claims;
pub mod feed;
pub mod placement;
pub mod posts;
pub mod presence;

pub use claims::ClaimService;
pub use feed::FeedService;
pub use posts::PostingService;
pub use presence::PresenceService;
