use agora_wire::replication::ReplicationOp;
use agora_wire::request::{
    ChannelCreateData, HistoryChannelData, HistoryMessagesData, LoginData, MessageData, PublishData,
};
use agora_wire::response::{
    ChannelInfo, ChannelReply, ChannelsReply, HistoryChannelReply, HistoryMessagesReply, LoginReply,
    MessageReply, PrivateMessageWire, PublicationWire, PublishReply, SyncReply, UsersReply,
};

use crate::state::{Channel, PrivateMessage, Publication, ReplicatedState};

pub const CHANNEL_EXISTS: &str = "Canal já existe";
pub const CHANNEL_NOT_FOUND: &str = "Canal não existe";
pub const RECIPIENT_NOT_FOUND: &str = "Usuário não existe";

pub enum TopicPost {
    Channel(String, PublicationWire),
    Private(String, PrivateMessageWire),
}

pub fn login(
    state: &mut ReplicatedState,
    data: &LoginData,
    clock: u64,
) -> (LoginReply, Option<ReplicationOp>) {
    let added = state.add_user(data.user.clone());
    let op = added.then(|| ReplicationOp::Login {
        user: data.user.clone(),
    });
    (
        LoginReply {
            success: true,
            message: format!("Usuário {} logado", data.user),
            clock,
        },
        op,
    )
}

pub fn users(state: &ReplicatedState, clock: u64) -> UsersReply {
    let mut users = state.users.clone();
    users.sort();
    UsersReply { users, clock }
}

fn channel_info(channel: &Channel) -> ChannelInfo {
    ChannelInfo {
        name: channel.name.clone(),
        creator: channel.creator.clone(),
        timestamp: channel.timestamp,
        clock: channel.logical_clock,
        subscribers: channel.subscribers.clone(),
    }
}

pub fn channel(
    state: &mut ReplicatedState,
    data: &ChannelCreateData,
    timestamp: f64,
    clock: u64,
) -> (ChannelReply, Option<ReplicationOp>) {
    if state.channels.contains_key(&data.channel) {
        return (
            ChannelReply {
                success: false,
                message: CHANNEL_EXISTS.to_string(),
                clock,
            },
            None,
        );
    }
    state.add_channel(Channel {
        name: data.channel.clone(),
        creator: data.user.clone(),
        timestamp,
        logical_clock: clock,
        subscribers: vec![data.user.clone()],
    });
    let op = ReplicationOp::ChannelCreate {
        channel: data.channel.clone(),
        creator: data.user.clone(),
        timestamp,
        logical_clock: clock,
    };
    (
        ChannelReply {
            success: true,
            message: "Canal criado".to_string(),
            clock,
        },
        Some(op),
    )
}

pub fn channels(state: &ReplicatedState, clock: u64) -> ChannelsReply {
    ChannelsReply {
        channels: state.channels.values().map(channel_info).collect(),
        clock,
    }
}

pub fn publish(
    state: &mut ReplicatedState,
    data: &PublishData,
    timestamp: f64,
    clock: u64,
) -> (PublishReply, Option<ReplicationOp>, Option<TopicPost>) {
    if !state.channels.contains_key(&data.channel) {
        return (
            PublishReply {
                success: false,
                message: CHANNEL_NOT_FOUND.to_string(),
                clock,
            },
            None,
            None,
        );
    }
    state.add_publication(Publication {
        channel: data.channel.clone(),
        user: data.user.clone(),
        message: data.message.clone(),
        timestamp,
        logical_ts: clock,
    });
    let op = ReplicationOp::Publish {
        channel: data.channel.clone(),
        user: data.user.clone(),
        message: data.message.clone(),
        timestamp,
        logical_ts: clock,
    };
    let post = TopicPost::Channel(
        data.channel.clone(),
        PublicationWire {
            channel: data.channel.clone(),
            user: data.user.clone(),
            message: data.message.clone(),
            timestamp,
            logical_ts: clock,
        },
    );
    (
        PublishReply {
            success: true,
            message: "Publicado".to_string(),
            clock,
        },
        Some(op),
        Some(post),
    )
}

pub fn message(
    state: &mut ReplicatedState,
    data: &MessageData,
    timestamp: f64,
    clock: u64,
) -> (MessageReply, Option<ReplicationOp>, Option<TopicPost>) {
    if !state.has_user(&data.to) {
        return (
            MessageReply {
                success: false,
                message: RECIPIENT_NOT_FOUND.to_string(),
                clock,
            },
            None,
            None,
        );
    }
    state.add_message(PrivateMessage {
        from: data.from.clone(),
        to: data.to.clone(),
        message: data.message.clone(),
        timestamp,
        logical_ts: clock,
    });
    let op = ReplicationOp::Message {
        from: data.from.clone(),
        to: data.to.clone(),
        message: data.message.clone(),
        timestamp,
        logical_ts: clock,
    };
    let post = TopicPost::Private(
        data.to.clone(),
        PrivateMessageWire {
            from: data.from.clone(),
            to: data.to.clone(),
            message: data.message.clone(),
            timestamp,
            logical_ts: clock,
        },
    );
    (
        MessageReply {
            success: true,
            message: "Mensagem enviada".to_string(),
            clock,
        },
        Some(op),
        Some(post),
    )
}

pub fn history_messages(
    state: &ReplicatedState,
    data: &HistoryMessagesData,
    clock: u64,
) -> HistoryMessagesReply {
    HistoryMessagesReply {
        messages: state
            .messages_for(&data.user)
            .into_iter()
            .map(|m| PrivateMessageWire {
                from: m.from.clone(),
                to: m.to.clone(),
                message: m.message.clone(),
                timestamp: m.timestamp,
                logical_ts: m.logical_ts,
            })
            .collect(),
        clock,
    }
}

pub fn history_channel(
    state: &ReplicatedState,
    data: &HistoryChannelData,
    clock: u64,
) -> HistoryChannelReply {
    HistoryChannelReply {
        publications: state
            .publications_for(&data.channel)
            .into_iter()
            .map(|p| PublicationWire {
                channel: p.channel.clone(),
                user: p.user.clone(),
                message: p.message.clone(),
                timestamp: p.timestamp,
                logical_ts: p.logical_ts,
            })
            .collect(),
        clock,
    }
}

pub fn sync(state: &ReplicatedState, clock: u64) -> SyncReply {
    SyncReply {
        users: state.users.clone(),
        channels: state.channels.values().map(channel_info).collect(),
        messages: state
            .messages
            .iter()
            .map(|m| PrivateMessageWire {
                from: m.from.clone(),
                to: m.to.clone(),
                message: m.message.clone(),
                timestamp: m.timestamp,
                logical_ts: m.logical_ts,
            })
            .collect(),
        publications: state
            .publications
            .iter()
            .map(|p| PublicationWire {
                channel: p.channel.clone(),
                user: p.user.clone(),
                message: p.message.clone(),
                timestamp: p.timestamp,
                logical_ts: p.logical_ts,
            })
            .collect(),
        clock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_is_idempotent_on_replay() {
        let mut state = ReplicatedState::new();
        let data = LoginData {
            user: "alice".to_string(),
            clock: 1,
            timestamp: 0.0,
        };
        let (first, op) = login(&mut state, &data, 2);
        assert!(first.success);
        assert!(op.is_some());
        let (second, op) = login(&mut state, &data, 3);
        assert!(second.success);
        assert!(op.is_none());
        assert_eq!(state.users.len(), 1);
    }

    #[test]
    fn channel_create_conflict_returns_failure_without_mutating() {
        let mut state = ReplicatedState::new();
        let data = ChannelCreateData {
            channel: "sports".to_string(),
            user: "alice".to_string(),
            clock: 5,
            timestamp: 0.0,
        };
        let (first, op) = channel(&mut state, &data, 10.0, 6);
        assert!(first.success);
        assert!(op.is_some());

        let (second, op) = channel(&mut state, &data, 20.0, 7);
        assert!(!second.success);
        assert_eq!(second.message, CHANNEL_EXISTS);
        assert!(op.is_none());
        assert_eq!(state.channels.len(), 1);
        assert_eq!(state.channels["sports"].timestamp, 10.0);
    }

    #[test]
    fn publish_to_unknown_channel_errors() {
        let mut state = ReplicatedState::new();
        let data = PublishData {
            channel: "nowhere".to_string(),
            user: "alice".to_string(),
            message: "hi".to_string(),
            clock: 1,
            timestamp: 0.0,
        };
        let (reply, op, post) = publish(&mut state, &data, 1.0, 2);
        assert!(!reply.success);
        assert_eq!(reply.message, CHANNEL_NOT_FOUND);
        assert!(op.is_none());
        assert!(matches!(post, None));
        assert!(state.publications.is_empty());
    }

    #[test]
    fn message_to_unknown_recipient_errors() {
        let mut state = ReplicatedState::new();
        let data = MessageData {
            from: "alice".to_string(),
            to: "bob".to_string(),
            message: "hi".to_string(),
            clock: 1,
            timestamp: 0.0,
        };
        let (reply, op, post) = message(&mut state, &data, 1.0, 2);
        assert!(!reply.success);
        assert_eq!(reply.message, RECIPIENT_NOT_FOUND);
        assert!(op.is_none());
        assert!(matches!(post, None));
        assert!(state.messages.is_empty());
    }

    #[test]
    fn publish_to_known_channel_replicates_and_posts() {
        let mut state = ReplicatedState::new();
        state.add_channel(Channel {
            name: "sports".to_string(),
            creator: "alice".to_string(),
            timestamp: 0.0,
            logical_clock: 1,
            subscribers: vec!["alice".to_string()],
        });
        let data = PublishData {
            channel: "sports".to_string(),
            user: "alice".to_string(),
            message: "goal!".to_string(),
            clock: 1,
            timestamp: 0.0,
        };
        let (reply, op, post) = publish(&mut state, &data, 5.0, 6);
        assert!(reply.success);
        assert!(matches!(op, Some(ReplicationOp::Publish { .. })));
        assert!(matches!(post, Some(TopicPost::Channel(c, _)) if c == "sports"));
        assert_eq!(state.publications.len(), 1);
    }
}
