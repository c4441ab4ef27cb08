use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Channel {
    pub name: String,
    pub creator: String,
    pub timestamp: f64,
    pub logical_clock: u64,
    pub subscribers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrivateMessage {
    pub from: String,
    pub to: String,
    pub message: String,
    pub timestamp: f64,
    pub logical_ts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publication {
    pub channel: String,
    pub user: String,
    pub message: String,
    pub timestamp: f64,
    pub logical_ts: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicatedState {
    pub users: Vec<String>,
    pub channels: BTreeMap<String, Channel>,
    pub messages: Vec<PrivateMessage>,
    pub publications: Vec<Publication>,
}

impl ReplicatedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.users.iter().any(|u| u == name)
    }

    pub fn add_user(&mut self, name: String) -> bool {
        if self.has_user(&name) {
            return false;
        }
        self.users.push(name);
        true
    }

    pub fn add_channel(&mut self, channel: Channel) -> bool {
        if self.channels.contains_key(&channel.name) {
            return false;
        }
        self.channels.insert(channel.name.clone(), channel);
        true
    }

    const DEDUP_WINDOW_SECS: f64 = 1.0;

    pub fn add_message(&mut self, message: PrivateMessage) -> bool {
        let is_duplicate = self.messages.iter().any(|existing| {
            existing.from == message.from
                && existing.to == message.to
                && existing.message == message.message
                && (existing.timestamp - message.timestamp).abs() < Self::DEDUP_WINDOW_SECS
        });
        if is_duplicate {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn add_publication(&mut self, publication: Publication) -> bool {
        let is_duplicate = self.publications.iter().any(|existing| {
            existing.channel == publication.channel
                && existing.user == publication.user
                && existing.message == publication.message
                && (existing.timestamp - publication.timestamp).abs() < Self::DEDUP_WINDOW_SECS
        });
        if is_duplicate {
            return false;
        }
        self.publications.push(publication);
        true
    }

    pub fn messages_for(&self, user: &str) -> Vec<&PrivateMessage> {
        let mut matches: Vec<&PrivateMessage> = self
            .messages
            .iter()
            .filter(|m| m.from == user || m.to == user)
            .collect();
        matches.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        matches
    }

    pub fn publications_for(&self, channel: &str) -> Vec<&Publication> {
        let mut matches: Vec<&Publication> = self
            .publications
            .iter()
            .filter(|p| p.channel == channel)
            .collect();
        matches.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        matches
    }
}
