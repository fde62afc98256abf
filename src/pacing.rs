/*!
 * Minimum-interval gate between consecutive model calls.
 *
 * Hosted inference endpoints throttle bursts, so calls issued through one
 * pacer are spaced at least `min_interval` apart. The first call passes
 * immediately.
 */

use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces calls at least `min_interval` apart.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// A pacer that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call is allowed, then mark it as issued.
    pub async fn ready(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Pacing model calls: waiting {} ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
