use serde::{Deserialize, Serialize};

use crate::clocksync::ClockSyncMessage;
use crate::election::ElectionMessage;

/// The `servers` topic carries both Bully election traffic and Berkeley
/// clock-sync traffic, so `SUB-servers` needs a single decode target that
/// tries both message families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServersMessage {
    Election(ElectionMessage),
    ClockSync(ClockSyncMessage),
}
