use serde::{Deserialize, Serialize};

/// Messages exchanged to run a Berkeley-style physical clock sync round,
/// coordinated by whichever node currently holds the election. Carried on
/// the same `servers` topic as [`crate::election::ElectionMessage`]; see
/// [`crate::servers::ServersMessage`] for the combined decode target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockSyncMessage {
    Request {
        from: String,
        clock: u64,
        timestamp: f64,
    },
    Response {
        from: String,
        time: f64,
        clock: u64,
        timestamp: f64,
    },
    Adjust {
        from: String,
        offset: f64,
        clock: u64,
        timestamp: f64,
    },
}

impl ClockSyncMessage {
    pub fn clock(&self) -> u64 {
        match self {
            Self::Request { clock, .. } => *clock,
            Self::Response { clock, .. } => *clock,
            Self::Adjust { clock, .. } => *clock,
        }
    }
}
