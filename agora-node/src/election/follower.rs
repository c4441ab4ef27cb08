use std::time::Instant;

/// A node that believes someone else is (or will become) coordinator.
/// Tracks the last time it heard from that coordinator so the heartbeat
/// timeout can fire.
pub struct Follower {
    pub last_coordinator_heartbeat: Instant,
}

impl Follower {
    pub fn new() -> Self {
        Self {
            last_coordinator_heartbeat: Instant::now(),
        }
    }
}
