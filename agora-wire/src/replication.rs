use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "data", rename_all = "snake_case")]
pub enum ReplicationOp {
    Login {
        user: String,
    },
    ChannelCreate {
        channel: String,
        creator: String,
        timestamp: f64,
        logical_clock: u64,
    },
    Publish {
        channel: String,
        user: String,
        message: String,
        timestamp: f64,
        logical_ts: u64,
    },
    Message {
        from: String,
        to: String,
        message: String,
        timestamp: f64,
        logical_ts: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationEvent {
    #[serde(flatten)]
    pub op: ReplicationOp,
    pub source: String,
    pub clock: u64,
    pub timestamp: f64,
}
