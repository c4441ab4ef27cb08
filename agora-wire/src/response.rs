use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LoginReply {
    pub success: bool,
    pub message: String,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersReply {
    pub users: Vec<String>,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReply {
    pub success: bool,
    pub message: String,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelInfo {
    pub name: String,
    pub creator: String,
    pub timestamp: f64,
    pub clock: u64,
    pub subscribers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelsReply {
    pub channels: Vec<ChannelInfo>,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishReply {
    pub success: bool,
    pub message: String,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageReply {
    pub success: bool,
    pub message: String,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrivateMessageWire {
    pub from: String,
    pub to: String,
    pub message: String,
    pub timestamp: f64,
    pub logical_ts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryMessagesReply {
    pub messages: Vec<PrivateMessageWire>,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationWire {
    pub channel: String,
    pub user: String,
    pub message: String,
    pub timestamp: f64,
    pub logical_ts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryChannelReply {
    pub publications: Vec<PublicationWire>,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReply {
    pub users: Vec<String>,
    pub channels: Vec<ChannelInfo>,
    pub messages: Vec<PrivateMessageWire>,
    pub publications: Vec<PublicationWire>,
    pub clock: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReply {
    pub error: String,
}
