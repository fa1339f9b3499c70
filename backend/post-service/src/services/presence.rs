/// Presence
///
/// Last-known user location, refreshed by the map client while it watches
/// the device position. One row per user.
use std::sync::Arc;

use geo_core::Point;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Presence;
use crate::repository::PresenceStore;

#[derive(Clone)]
pub struct PresenceService {
    store: Arc<dyn PresenceStore>,
}

impl PresenceService {
    pub fn new(store: Arc<dyn PresenceStore>) -> Self {
        Self { store }
    }

    pub async fn report(&self, user_id: Uuid, location: Point) -> Result<Presence> {
        self.store.upsert_presence(user_id, location).await
    }
}
