//! Application state shared across routes

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::game::World;
use crate::store::{ElasticClient, ShipMirror};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub world: Arc<World>,
    /// Persistence mirror; absent when no document store is configured.
    pub mirror: Option<Arc<ShipMirror>>,
    pub started: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let world = Arc::new(World::new());

        // Mirroring is optional: without ELASTIC_URL the server runs
        // simulation-only.
        let mirror = config
            .elastic_url
            .as_deref()
            .map(|url| Arc::new(ShipMirror::new(ElasticClient::new(url))));

        Self {
            config,
            world,
            mirror,
            started: Instant::now(),
        }
    }
}
