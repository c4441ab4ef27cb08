use agora_wire::replication::{ReplicationEvent, ReplicationOp};
use tracing::debug;

use crate::state::{Channel, PrivateMessage, Publication, ReplicatedState};

/// Applies a replication event received from a peer. The caller has
/// already dropped events whose `source` is this node's own name.
pub fn apply_mutation(state: &mut ReplicatedState, event: &ReplicationEvent) -> bool {
    let changed = match &event.op {
        ReplicationOp::Login { user } => state.add_user(user.clone()),
        ReplicationOp::ChannelCreate {
            channel,
            creator,
            timestamp,
            logical_clock,
        } => state.add_channel(Channel {
            name: channel.clone(),
            creator: creator.clone(),
            timestamp: *timestamp,
            logical_clock: *logical_clock,
            subscribers: vec![creator.clone()],
        }),
        ReplicationOp::Publish {
            channel,
            user,
            message,
            timestamp,
            logical_ts,
        } => state.add_publication(Publication {
            channel: channel.clone(),
            user: user.clone(),
            message: message.clone(),
            timestamp: *timestamp,
            logical_ts: *logical_ts,
        }),
        ReplicationOp::Message {
            from,
            to,
            message,
            timestamp,
            logical_ts,
        } => state.add_message(PrivateMessage {
            from: from.clone(),
            to: to.clone(),
            message: message.clone(),
            timestamp: *timestamp,
            logical_ts: *logical_ts,
        }),
    };
    debug!(source = %event.source, changed, "applied replication event");
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applying_the_same_event_twice_is_idempotent() {
        let mut state = ReplicatedState::new();
        let event = ReplicationEvent {
            op: ReplicationOp::Login {
                user: "alice".to_string(),
            },
            source: "node-b".to_string(),
            clock: 1,
            timestamp: 0.0,
        };
        assert!(apply_mutation(&mut state, &event));
        assert!(!apply_mutation(&mut state, &event));
        assert_eq!(state.users.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_op() -> impl Strategy<Value = ReplicationOp> {
            prop_oneof![
                "[a-z]{1,8}".prop_map(|user| ReplicationOp::Login { user }),
                ("[a-z]{1,8}", "[a-z]{1,8}", 0.0f64..1_000_000.0, 0u64..1000).prop_map(
                    |(channel, creator, timestamp, logical_clock)| ReplicationOp::ChannelCreate {
                        channel,
                        creator,
                        timestamp,
                        logical_clock,
                    }
                ),
                (
                    "[a-z]{1,8}",
                    "[a-z]{1,8}",
                    "[a-z]{1,16}",
                    0.0f64..1_000_000.0,
                    0u64..1000
                )
                    .prop_map(|(channel, user, message, timestamp, logical_ts)| {
                        ReplicationOp::Publish {
                            channel,
                            user,
                            message,
                            timestamp,
                            logical_ts,
                        }
                    }),
                (
                    "[a-z]{1,8}",
                    "[a-z]{1,8}",
                    "[a-z]{1,16}",
                    0.0f64..1_000_000.0,
                    0u64..1000
                )
                    .prop_map(|(from, to, message, timestamp, logical_ts)| {
                        ReplicationOp::Message {
                            from,
                            to,
                            message,
                            timestamp,
                            logical_ts,
                        }
                    }),
            ]
        }

        proptest! {
            #[test]
            fn replaying_any_event_twice_is_idempotent(op in arb_op(), clock in 0u64..1000) {
                let mut state = ReplicatedState::new();
                let event = ReplicationEvent {
                    op,
                    source: "peer".to_string(),
                    clock,
                    timestamp: 0.0,
                };
                let first = apply_mutation(&mut state, &event);
                let before = state.clone();
                let second = apply_mutation(&mut state, &event);
                prop_assert!(first);
                prop_assert!(!second);
                prop_assert_eq!(state.users, before.users);
                prop_assert_eq!(state.channels, before.channels);
                prop_assert_eq!(state.messages, before.messages);
                prop_assert_eq!(state.publications, before.publications);
            }
        }
    }
}
