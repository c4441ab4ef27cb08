use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

const RESPONSE_WINDOW: Duration = Duration::from_secs(2);

pub struct PendingRound {
    started_at: Instant,
    own_time_at_request: f64,
    responses: HashMap<String, f64>,
}

impl PendingRound {
    pub fn new(own_time: f64) -> Self {
        Self {
            started_at: Instant::now(),
            own_time_at_request: own_time,
            responses: HashMap::new(),
        }
    }

    pub fn record(&mut self, from: String, time: f64) {
        self.responses.insert(from, time);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.duration_since(self.started_at) >= RESPONSE_WINDOW
    }

    /// Mean of `(peer_time - own_time)` across every response received in
    /// the window, including the coordinator's own zero delta.
    pub fn finish(self) -> f64 {
        let sum: f64 = self
            .responses
            .values()
            .map(|&t| t - self.own_time_at_request)
            .sum();
        let n = self.responses.len() as f64 + 1.0;
        let offset = sum / n;
        debug!(
            peers = self.responses.len(),
            offset, "berkeley sync round finalized"
        );
        offset
    }
}
