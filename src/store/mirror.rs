//! Background sweep mirroring ship state into the document store

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::game::World;
use crate::store::elastic::{ElasticClient, ShipDocument};

/// How often live ship state is swept into the index.
const SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Fire-and-forget persistence mirror. Every live ship is upserted on a
/// fixed cadence, plus once more with its final state on disconnect, so
/// documents outlive their sessions.
pub struct ShipMirror {
    client: ElasticClient,
    pending: Mutex<Vec<ShipDocument>>,
}

impl ShipMirror {
    pub fn new(client: ElasticClient) -> Self {
        Self {
            client,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Queue a document ahead of the regular sweep.
    pub async fn push(&self, doc: ShipDocument) {
        self.pending.lock().await.push(doc);
    }

    /// Mirror loop; runs until the server shuts down. Upsert failures are
    /// logged and skipped, the simulation never waits on the store.
    pub async fn run(self: Arc<Self>, world: Arc<World>) {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let mut docs: Vec<ShipDocument> = self.pending.lock().await.drain(..).collect();
            docs.extend(world.snapshot_all().iter().map(ShipDocument::from_snapshot));
            if docs.is_empty() {
                continue;
            }
            for doc in &docs {
                if let Err(err) = self.client.put_ship(doc).await {
                    warn!(token = %doc.token, error = %err, "ship mirror upsert failed");
                }
            }
            debug!(count = docs.len(), "mirrored ship documents");
        }
    }
}
