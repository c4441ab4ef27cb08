use serde::{Deserialize, Serialize};

/// Messages exchanged on the `servers` pub/sub topic to run the Bully
/// election protocol. Lower `rank` wins, mirroring the reference-server's
/// registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElectionMessage {
    Heartbeat {
        coordinator: String,
        rank: u32,
        clock: u64,
        timestamp: f64,
    },
    Election {
        from: String,
        from_rank: u32,
        clock: u64,
        timestamp: f64,
    },
    ElectionOk {
        from: String,
        to: String,
        rank: u32,
        clock: u64,
        timestamp: f64,
    },
    CoordinatorAnnouncement {
        coordinator: String,
        rank: u32,
        clock: u64,
        timestamp: f64,
    },
}

impl ElectionMessage {
    pub fn clock(&self) -> u64 {
        match self {
            Self::Heartbeat { clock, .. } => *clock,
            Self::Election { clock, .. } => *clock,
            Self::ElectionOk { clock, .. } => *clock,
            Self::CoordinatorAnnouncement { clock, .. } => *clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_msgpack() {
        let message = ElectionMessage::Election {
            from: "node-a".into(),
            from_rank: 3,
            clock: 7,
            timestamp: 42.0,
        };
        let bytes = rmp_serde::to_vec_named(&message).unwrap();
        let decoded: ElectionMessage = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, message);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_message() -> impl Strategy<Value = ElectionMessage> {
            prop_oneof![
                ("[a-z]{1,8}", 1u32..100, 0u64..1000, 0.0f64..1e12).prop_map(
                    |(coordinator, rank, clock, timestamp)| ElectionMessage::Heartbeat {
                        coordinator,
                        rank,
                        clock,
                        timestamp,
                    }
                ),
                ("[a-z]{1,8}", 1u32..100, 0u64..1000, 0.0f64..1e12).prop_map(
                    |(from, from_rank, clock, timestamp)| ElectionMessage::Election {
                        from,
                        from_rank,
                        clock,
                        timestamp,
                    }
                ),
                ("[a-z]{1,8}", "[a-z]{1,8}", 1u32..100, 0u64..1000, 0.0f64..1e12).prop_map(
                    |(from, to, rank, clock, timestamp)| ElectionMessage::ElectionOk {
                        from,
                        to,
                        rank,
                        clock,
                        timestamp,
                    }
                ),
                ("[a-z]{1,8}", 1u32..100, 0u64..1000, 0.0f64..1e12).prop_map(
                    |(coordinator, rank, clock, timestamp)| {
                        ElectionMessage::CoordinatorAnnouncement {
                            coordinator,
                            rank,
                            clock,
                            timestamp,
                        }
                    }
                ),
            ]
        }

        proptest! {
            #[test]
            fn any_election_message_round_trips_through_msgpack(message in arb_message()) {
                let bytes = rmp_serde::to_vec_named(&message).unwrap();
                let decoded: ElectionMessage = rmp_serde::from_slice(&bytes).unwrap();
                prop_assert_eq!(decoded, message);
            }
        }
    }
}
