//! Provider-wide request pacing.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Minimum-interval gate in front of a provider.
///
/// Concurrent enrichment workers all funnel through [`pace`](Pacer::pace),
/// so the provider sees at most one request per interval no matter how many
/// lookups are in flight. The lock is held across the sleep; waiters queue
/// up behind it.
pub struct Pacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a pacer with the given minimum interval between requests.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the provider may be called again, then claim the slot.
    pub async fn pace(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("pacing: waiting {:?}", wait);
                sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }
}
