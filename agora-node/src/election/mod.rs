mod candidate;
mod follower;
mod leader;

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub use candidate::Candidate;
pub use follower::Follower;
pub use leader::Leader;
use tracing::{debug, info};

/// An effect a state transition wants turned into a wire message. The
/// sender's name/rank and a fresh logical clock are filled in by the
/// caller at publish time (`Node::apply_election_effects`).
#[derive(Debug, Clone)]
pub enum Outbound {
    Election,
    ElectionOk { to: String },
    CoordinatorAnnouncement,
    Heartbeat,
}

enum Role {
    Follower(Follower),
    Candidate(Candidate),
    Leader(Leader),
}

/// Per-node Bully election state. Lower `rank` always wins.
pub struct Election {
    self_name: String,
    self_rank: u32,
    coordinator: Option<String>,
    role: Role,
}

impl Election {
    pub fn new(self_name: String, self_rank: u32) -> Self {
        if self_rank == 1 {
            info!(name = %self_name, "rank 1 at startup, becoming coordinator immediately");
            Self {
                coordinator: Some(self_name.clone()),
                role: Role::Leader(Leader::new()),
                self_name,
                self_rank,
            }
        } else {
            Self {
                coordinator: None,
                role: Role::Follower(Follower::new()),
                self_name,
                self_rank,
            }
        }
    }

    pub fn self_rank(&self) -> u32 {
        self.self_rank
    }

    pub fn coordinator(&self) -> Option<&str> {
        self.coordinator.as_deref()
    }

    pub fn is_leader(&self) -> bool {
        matches!(self.role, Role::Leader(_))
    }

    fn is_candidate(&self) -> bool {
        matches!(self.role, Role::Candidate(_))
    }

    fn become_follower_of(&mut self, coordinator: String, now: Instant) {
        self.coordinator = Some(coordinator);
        self.role = Role::Follower(Follower {
            last_coordinator_heartbeat: now,
        });
    }

    fn become_coordinator(&mut self) -> Vec<Outbound> {
        info!(name = %self.self_name, "becoming coordinator");
        self.coordinator = Some(self.self_name.clone());
        self.role = Role::Leader(Leader::new());
        vec![Outbound::CoordinatorAnnouncement]
    }

    /// If no known peer outranks us, we win uncontested and become
    /// coordinator directly; otherwise we become a candidate and the
    /// caller broadcasts an `Election` message. The caller refreshes
    /// `peers` before calling this.
    pub fn start_election(&mut self, peers: &HashMap<String, u32>) -> Vec<Outbound> {
        if self.is_candidate() {
            return Vec::new();
        }
        let has_lower_ranked_peer = peers.values().any(|&rank| rank < self.self_rank);
        if !has_lower_ranked_peer {
            return self.become_coordinator();
        }
        debug!(rank = self.self_rank, "starting election");
        self.role = Role::Candidate(Candidate::new());
        vec![Outbound::Election]
    }

    pub fn heartbeat_is_stale(&self, now: Instant, timeout: Duration) -> bool {
        matches!(&self.role, Role::Follower(f) if now.duration_since(f.last_coordinator_heartbeat) > timeout)
    }

    pub fn on_election_timeout_tick(&mut self, now: Instant, timeout: Duration) -> Vec<Outbound> {
        match &self.role {
            Role::Candidate(c) if now.duration_since(c.started_at) >= timeout => {
                if c.responses.is_empty() {
                    self.become_coordinator()
                } else {
                    debug!("election responses received, awaiting coordinator announcement");
                    self.role = Role::Follower(Follower::new());
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn on_heartbeat_emit_tick(&mut self, now: Instant, interval: Duration) -> Vec<Outbound> {
        match &mut self.role {
            Role::Leader(l) if now.duration_since(l.last_emitted) >= interval => {
                l.last_emitted = now;
                vec![Outbound::Heartbeat]
            }
            _ => Vec::new(),
        }
    }

    fn adopt_coordinator(&mut self, coordinator: String, now: Instant) {
        if coordinator == self.self_name {
            return;
        }
        if self.coordinator.as_deref() != Some(coordinator.as_str()) {
            info!(coordinator = %coordinator, "adopting coordinator");
        }
        self.become_follower_of(coordinator, now);
    }

    pub fn on_heartbeat(&mut self, coordinator: String, now: Instant) {
        self.adopt_coordinator(coordinator, now);
    }

    pub fn on_announcement(&mut self, coordinator: String, now: Instant) {
        self.adopt_coordinator(coordinator, now);
    }

    /// If we outrank the sender, stand it down with `election_ok` and
    /// signal that this node must cascade into its own election. The
    /// caller refreshes `servers` and calls `start_election` when `true`
    /// comes back. A Leader ignores the message entirely.
    pub fn on_election(&mut self, from: String, from_rank: u32) -> (bool, Vec<Outbound>) {
        if self.is_leader() {
            return (false, Vec::new());
        }
        if self.self_rank < from_rank {
            (true, vec![Outbound::ElectionOk { to: from }])
        } else {
            (false, Vec::new())
        }
    }

    pub fn on_election_ok(&mut self, from: String) {
        if let Role::Candidate(c) = &mut self.role {
            c.responses.insert(from);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peers(ranks: &[(&str, u32)]) -> HashMap<String, u32> {
        ranks.iter().map(|(n, r)| (n.to_string(), *r)).collect()
    }

    #[test]
    fn rank_one_starts_as_leader() {
        let election = Election::new("a".to_string(), 1);
        assert!(election.is_leader());
        assert_eq!(election.coordinator(), Some("a"));
    }

    #[test]
    fn other_ranks_start_as_followers() {
        let election = Election::new("b".to_string(), 2);
        assert!(!election.is_leader());
        assert_eq!(election.coordinator(), None);
    }

    #[test]
    fn start_election_with_no_lower_ranked_peer_becomes_coordinator() {
        let mut election = Election::new("c".to_string(), 3);
        let effects = election.start_election(&peers(&[("a", 5), ("b", 4)]));
        assert!(matches!(effects.as_slice(), [Outbound::CoordinatorAnnouncement]));
        assert!(election.is_leader());
    }

    #[test]
    fn start_election_with_lower_ranked_peer_becomes_candidate() {
        let mut election = Election::new("c".to_string(), 3);
        let effects = election.start_election(&peers(&[("a", 1), ("b", 4)]));
        assert!(matches!(effects.as_slice(), [Outbound::Election]));
        assert!(!election.is_leader());
    }

    #[test]
    fn second_start_election_while_candidate_is_a_no_op() {
        let mut election = Election::new("c".to_string(), 3);
        election.start_election(&peers(&[("a", 1)]));
        let effects = election.start_election(&peers(&[("a", 1)]));
        assert!(effects.is_empty());
    }

    #[test]
    fn election_ok_prevents_becoming_coordinator() {
        let mut election = Election::new("c".to_string(), 3);
        election.start_election(&peers(&[("a", 1)]));
        election.on_election_ok("a".to_string());
        let effects = election.on_election_timeout_tick(
            Instant::now() + Duration::from_secs(10),
            Duration::from_secs(3),
        );
        assert!(effects.is_empty());
        assert!(!election.is_leader());
    }

    #[test]
    fn no_responses_becomes_coordinator_after_timeout() {
        let mut election = Election::new("c".to_string(), 3);
        election.start_election(&peers(&[("a", 1)]));
        let effects = election.on_election_timeout_tick(
            Instant::now() + Duration::from_secs(10),
            Duration::from_secs(3),
        );
        assert!(matches!(effects.as_slice(), [Outbound::CoordinatorAnnouncement]));
        assert!(election.is_leader());
    }

    #[test]
    fn outranked_node_sends_election_ok_and_cascades() {
        let mut election = Election::new("b".to_string(), 2);
        let (cascade, effects) = election.on_election("c".to_string(), 3);
        assert!(cascade);
        assert!(matches!(effects.as_slice(), [Outbound::ElectionOk { to }] if to == "c"));
    }

    #[test]
    fn higher_priority_node_ignores_election_from_weaker_peer() {
        let mut election = Election::new("a".to_string(), 1);
        let (cascade, effects) = election.on_election("c".to_string(), 3);
        assert!(!cascade);
        assert!(effects.is_empty());
    }

    #[test]
    fn heartbeat_naming_self_is_ignored() {
        let mut election = Election::new("a".to_string(), 1);
        let before = election.coordinator().map(str::to_string);
        election.on_heartbeat("a".to_string(), Instant::now());
        assert_eq!(election.coordinator().map(str::to_string), before);
    }

    #[test]
    fn heartbeat_from_peer_demotes_leader() {
        let mut election = Election::new("a".to_string(), 1);
        election.on_heartbeat("b".to_string(), Instant::now());
        assert!(!election.is_leader());
        assert_eq!(election.coordinator(), Some("b"));
    }
}
