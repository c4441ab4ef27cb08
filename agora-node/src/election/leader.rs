use std::time::Instant;

/// The believed coordinator. Emits heartbeats on its own timer and steps
/// down the moment it sees a heartbeat or announcement naming someone
/// else.
pub struct Leader {
    pub last_emitted: Instant,
}

impl Leader {
    pub fn new() -> Self {
        Self {
            last_emitted: Instant::now(),
        }
    }
}
