use agora_core::Error;
use serde::{Deserialize, Serialize};

/// Every request carries the sender's logical clock and the wall-clock
/// timestamp it was issued at, on top of the service-specific fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BaseData {
    pub clock: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginData {
    pub user: String,
    pub clock: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelCreateData {
    pub channel: String,
    pub user: String,
    pub clock: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishData {
    pub channel: String,
    pub user: String,
    pub message: String,
    pub clock: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageData {
    pub from: String,
    pub to: String,
    pub message: String,
    pub clock: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryMessagesData {
    pub user: String,
    pub clock: u64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryChannelData {
    pub channel: String,
    pub clock: u64,
    pub timestamp: f64,
}

/// The sealed set of services a client REQ may invoke, as a closed enum
/// the compiler can exhaustively match on.
#[derive(Debug, Clone)]
pub enum ServiceRequest {
    Login(LoginData),
    Users(BaseData),
    Channel(ChannelCreateData),
    Channels(BaseData),
    Publish(PublishData),
    Message(MessageData),
    HistoryMessages(HistoryMessagesData),
    HistoryChannel(HistoryChannelData),
    Sync(BaseData),
}

impl ServiceRequest {
    pub fn decode(service: &str, data: rmpv::Value) -> Result<Self, Error> {
        match service {
            "login" => Ok(Self::Login(from_value(data)?)),
            "users" => Ok(Self::Users(from_value(data)?)),
            "channel" => Ok(Self::Channel(from_value(data)?)),
            "channels" => Ok(Self::Channels(from_value(data)?)),
            "publish" => Ok(Self::Publish(from_value(data)?)),
            "message" => Ok(Self::Message(from_value(data)?)),
            "history_messages" => Ok(Self::HistoryMessages(from_value(data)?)),
            "history_channel" => Ok(Self::HistoryChannel(from_value(data)?)),
            "sync" => Ok(Self::Sync(from_value(data)?)),
            other => Err(Error::Codec(format!("unknown service '{other}'"))),
        }
    }

    pub fn clock(&self) -> u64 {
        match self {
            Self::Login(d) => d.clock,
            Self::Users(d) => d.clock,
            Self::Channel(d) => d.clock,
            Self::Channels(d) => d.clock,
            Self::Publish(d) => d.clock,
            Self::Message(d) => d.clock,
            Self::HistoryMessages(d) => d.clock,
            Self::HistoryChannel(d) => d.clock,
            Self::Sync(d) => d.clock,
        }
    }

    pub fn service_name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Users(_) => "users",
            Self::Channel(_) => "channel",
            Self::Channels(_) => "channels",
            Self::Publish(_) => "publish",
            Self::Message(_) => "message",
            Self::HistoryMessages(_) => "history_messages",
            Self::HistoryChannel(_) => "history_channel",
            Self::Sync(_) => "sync",
        }
    }
}

fn from_value<T: for<'de> Deserialize<'de>>(value: rmpv::Value) -> Result<T, Error> {
    rmpv::ext::from_value(value).map_err(Error::codec)
}

/// The full frame carried over the REQ-in socket: `{service, data}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestEnvelope {
    pub service: String,
    pub data: rmpv::Value,
}

impl RequestEnvelope {
    pub fn into_service_request(self) -> Result<ServiceRequest, Error> {
        ServiceRequest::decode(&self.service, self.data)
    }
}
