use std::collections::HashMap;
use std::time::{Duration, Instant};

use agora_core::{LogicalClock, PhysicalClock, Result, Shutdown};
use agora_refclient::ReferenceClient;
use agora_wire::clocksync::ClockSyncMessage;
use agora_wire::election::ElectionMessage;
use agora_wire::replication::{ReplicationEvent, ReplicationOp};
use agora_wire::request::{RequestEnvelope, ServiceRequest};
use agora_wire::response::ErrorReply;
use agora_wire::servers::ServersMessage;
use agora_wire::topic;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::berkeley::PendingRound;
use crate::config::Settings;
use crate::election::{self, Election};
use crate::handlers::{self, TopicPost};
use crate::persistence::Store;
use crate::replication;
use crate::state::ReplicatedState;
use crate::transport::Sockets;

/// Owns every socket, the replicated state, and the coordination protocols.
/// Runs a single cooperative event loop multiplexing client requests,
/// replication, and election/clock-sync traffic.
pub struct Node {
    settings: Settings,
    sockets: Sockets,
    refclient: ReferenceClient,
    store: Store,
    state: ReplicatedState,
    clock: LogicalClock,
    physical: PhysicalClock,
    election: Election,
    servers: HashMap<String, u32>,
    pending_berkeley: Option<PendingRound>,
    message_count: u64,
    last_sync_message_count: u64,
    shutdown: Shutdown,
}

impl Node {
    pub fn new(settings: Settings) -> Result<Self> {
        let ctx = zmq::Context::new();
        let sockets = Sockets::connect(
            &ctx,
            &settings.broker_endpoint,
            &settings.proxy_in_endpoint,
            &settings.proxy_out_endpoint,
            &[topic::REPLICATION],
            &[topic::SERVERS],
        )?;

        let refclient = ReferenceClient::new(settings.reference_endpoint.clone());
        let store = Store::new(settings.data_dir.clone());
        let state = store.load()?;

        let mut clock = LogicalClock::new();
        let physical = PhysicalClock::new();
        let (rank, observed_clock) =
            refclient.rank(&settings.server_name, physical.now(), clock.tick());
        clock.observe(observed_clock);
        info!(server = %settings.server_name, rank, "registered with reference server");

        let election = Election::new(settings.server_name.clone(), rank);
        let shutdown = Shutdown::new()?;

        Ok(Self {
            settings,
            sockets,
            refclient,
            store,
            state,
            clock,
            physical,
            election,
            servers: HashMap::new(),
            pending_berkeley: None,
            message_count: 0,
            last_sync_message_count: 0,
            shutdown,
        })
    }

    /// Runs until `SIGINT`/`SIGTERM`. Blocks only inside [`Sockets::poll`].
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<()> {
        info!(
            server = %self.settings.server_name,
            rank = self.election.self_rank(),
            "node starting"
        );
        while !self.shutdown.is_shutdown() {
            let ready = self.sockets.poll(self.settings.poll_timeout_ms)?;

            if ready.req_in {
                self.handle_request()?;
            }
            if ready.sub_replication {
                self.handle_replication_frame()?;
            }
            if ready.sub_servers {
                self.handle_servers_frame()?;
            }

            self.tick_timers()?;
        }
        info!("node shutting down");
        Ok(())
    }

    // ---- client requests ------------------------------------------------

    #[instrument(skip(self))]
    fn handle_request(&mut self) -> Result<()> {
        let bytes = self.sockets.req_in.recv_bytes(0)?;
        let reply_bytes = match self.process_request(&bytes) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "request handling failed");
                agora_wire::encode(&ErrorReply {
                    error: err.to_string(),
                })?
            }
        };
        self.sockets.req_in.send(&reply_bytes, 0)?;

        self.message_count += 1;
        if self.election.is_leader()
            && self.message_count.saturating_sub(self.last_sync_message_count)
                >= self.settings.berkeley_sync_threshold
        {
            self.start_berkeley_round()?;
        }
        Ok(())
    }

    fn process_request(&mut self, bytes: &[u8]) -> Result<Vec<u8>> {
        let envelope: RequestEnvelope = agora_wire::decode(bytes)?;
        let service_name = envelope.service.clone();
        let request = envelope.into_service_request()?;
        self.clock.observe(request.clock());
        let reply = self.dispatch(request)?;
        debug!(service = %service_name, "handled request");
        Ok(reply)
    }

    fn dispatch(&mut self, request: ServiceRequest) -> Result<Vec<u8>> {
        match request {
            ServiceRequest::Login(data) => {
                let clock = self.clock.tick();
                let (reply, op) = handlers::login(&mut self.state, &data, clock);
                self.persist();
                if let Some(op) = op {
                    self.replicate(op)?;
                }
                agora_wire::encode(&reply)
            }
            ServiceRequest::Users(_) => {
                let clock = self.clock.tick();
                agora_wire::encode(&handlers::users(&self.state, clock))
            }
            ServiceRequest::Channel(data) => {
                let clock = self.clock.tick();
                let timestamp = self.physical.now();
                let (reply, op) = handlers::channel(&mut self.state, &data, timestamp, clock);
                self.persist();
                if let Some(op) = op {
                    self.replicate(op)?;
                }
                agora_wire::encode(&reply)
            }
            ServiceRequest::Channels(_) => {
                let clock = self.clock.tick();
                agora_wire::encode(&handlers::channels(&self.state, clock))
            }
            ServiceRequest::Publish(data) => {
                let clock = self.clock.tick();
                let timestamp = self.physical.now();
                let (reply, op, post) = handlers::publish(&mut self.state, &data, timestamp, clock);
                self.persist();
                if let Some(op) = op {
                    self.replicate(op)?;
                }
                if let Some(TopicPost::Channel(channel_name, wire)) = post {
                    self.publish_topic(&topic::channel(&channel_name), &wire)?;
                }
                agora_wire::encode(&reply)
            }
            ServiceRequest::Message(data) => {
                let clock = self.clock.tick();
                let timestamp = self.physical.now();
                let (reply, op, post) = handlers::message(&mut self.state, &data, timestamp, clock);
                self.persist();
                if let Some(op) = op {
                    self.replicate(op)?;
                }
                if let Some(TopicPost::Private(to, wire)) = post {
                    self.publish_topic(&topic::private(&to), &wire)?;
                }
                agora_wire::encode(&reply)
            }
            ServiceRequest::HistoryMessages(data) => {
                let clock = self.clock.tick();
                agora_wire::encode(&handlers::history_messages(&self.state, &data, clock))
            }
            ServiceRequest::HistoryChannel(data) => {
                let clock = self.clock.tick();
                agora_wire::encode(&handlers::history_channel(&self.state, &data, clock))
            }
            ServiceRequest::Sync(_) => {
                let clock = self.clock.tick();
                agora_wire::encode(&handlers::sync(&self.state, clock))
            }
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.state) {
            warn!(error = %err, "persistence failed, continuing with in-memory state");
        }
    }

    fn replicate(&mut self, op: ReplicationOp) -> Result<()> {
        let event = ReplicationEvent {
            op,
            source: self.settings.server_name.clone(),
            clock: self.clock.get(),
            timestamp: self.physical.now(),
        };
        let payload = agora_wire::encode(&event)?;
        self.sockets.publish(topic::REPLICATION, &payload)
    }

    fn publish_topic<T: Serialize>(&mut self, topic: &str, payload: &T) -> Result<()> {
        let bytes = agora_wire::encode(payload)?;
        self.sockets.publish(topic, &bytes)
    }

    // ---- replication ------------------------------------------------

    fn handle_replication_frame(&mut self) -> Result<()> {
        let (_topic, payload) = Sockets::recv_frame(&self.sockets.sub_replication)?;
        let event: ReplicationEvent = match agora_wire::decode(&payload) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "dropping malformed replication frame");
                return Ok(());
            }
        };
        if event.source == self.settings.server_name {
            return Ok(());
        }
        self.clock.observe(event.clock);
        let changed = replication::apply_mutation(&mut self.state, &event);
        if changed {
            self.persist();
        }
        Ok(())
    }

    // ---- election / clock-sync traffic -------------------------------

    fn handle_servers_frame(&mut self) -> Result<()> {
        let (_topic, payload) = Sockets::recv_frame(&self.sockets.sub_servers)?;
        let message: ServersMessage = match agora_wire::decode(&payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "dropping malformed servers frame");
                return Ok(());
            }
        };
        match message {
            ServersMessage::Election(msg) => self.handle_election_message(msg),
            ServersMessage::ClockSync(msg) => self.handle_clocksync_message(msg),
        }
    }

    fn handle_election_message(&mut self, msg: ElectionMessage) -> Result<()> {
        self.clock.observe(msg.clock());
        let now = Instant::now();
        match msg {
            ElectionMessage::Heartbeat { coordinator, .. } => {
                self.election.on_heartbeat(coordinator, now);
            }
            ElectionMessage::CoordinatorAnnouncement { coordinator, .. } => {
                self.election.on_announcement(coordinator, now);
            }
            ElectionMessage::Election { from, from_rank, .. } => {
                let (cascade, mut effects) = self.election.on_election(from, from_rank);
                if cascade {
                    self.refresh_servers();
                    effects.extend(self.election.start_election(&self.servers));
                }
                self.apply_election_effects(effects)?;
            }
            ElectionMessage::ElectionOk { from, to, .. } => {
                if to == self.settings.server_name {
                    self.election.on_election_ok(from);
                }
            }
        }
        Ok(())
    }

    fn apply_election_effects(&mut self, effects: Vec<election::Outbound>) -> Result<()> {
        for effect in effects {
            let clock = self.clock.tick();
            let timestamp = self.physical.now();
            let message = match effect {
                election::Outbound::Election => ElectionMessage::Election {
                    from: self.settings.server_name.clone(),
                    from_rank: self.election.self_rank(),
                    clock,
                    timestamp,
                },
                election::Outbound::ElectionOk { to } => ElectionMessage::ElectionOk {
                    from: self.settings.server_name.clone(),
                    to,
                    rank: self.election.self_rank(),
                    clock,
                    timestamp,
                },
                election::Outbound::CoordinatorAnnouncement => {
                    ElectionMessage::CoordinatorAnnouncement {
                        coordinator: self.settings.server_name.clone(),
                        rank: self.election.self_rank(),
                        clock,
                        timestamp,
                    }
                }
                election::Outbound::Heartbeat => ElectionMessage::Heartbeat {
                    coordinator: self.settings.server_name.clone(),
                    rank: self.election.self_rank(),
                    clock,
                    timestamp,
                },
            };
            let payload = agora_wire::encode(&message)?;
            self.sockets.publish(topic::SERVERS, &payload)?;
        }
        Ok(())
    }

    fn refresh_servers(&mut self) {
        let clock = self.clock.tick();
        let (peers, clock) = self.refclient.list(self.physical.now(), clock);
        self.clock.observe(clock);
        if peers.is_empty() && !self.servers.is_empty() {
            warn!("reference server returned no peers, keeping stale servers cache");
            return;
        }
        self.servers = peers.into_iter().map(|p| (p.name, p.rank)).collect();
    }

    fn handle_clocksync_message(&mut self, msg: ClockSyncMessage) -> Result<()> {
        self.clock.observe(msg.clock());
        match msg {
            ClockSyncMessage::Request { from, .. } => {
                if from == self.settings.server_name {
                    return Ok(());
                }
                let clock = self.clock.tick();
                let response = ClockSyncMessage::Response {
                    from: self.settings.server_name.clone(),
                    time: self.physical.now(),
                    clock,
                    timestamp: self.physical.now(),
                };
                let payload = agora_wire::encode(&response)?;
                self.sockets.publish(topic::SERVERS, &payload)?;
            }
            ClockSyncMessage::Response { from, time, .. } => {
                if from == self.settings.server_name {
                    return Ok(());
                }
                if let Some(round) = &mut self.pending_berkeley {
                    round.record(from, time);
                }
            }
            ClockSyncMessage::Adjust { from, offset, .. } => {
                if from == self.settings.server_name {
                    return Ok(());
                }
                self.physical.adjust(offset);
                debug!(offset, "applied berkeley clock adjustment");
            }
        }
        Ok(())
    }

    fn start_berkeley_round(&mut self) -> Result<()> {
        let own_time = self.physical.now();
        self.pending_berkeley = Some(PendingRound::new(own_time));
        self.last_sync_message_count = self.message_count;

        let clock = self.clock.tick();
        let request = ClockSyncMessage::Request {
            from: self.settings.server_name.clone(),
            clock,
            timestamp: own_time,
        };
        let payload = agora_wire::encode(&request)?;
        self.sockets.publish(topic::SERVERS, &payload)?;
        debug!("berkeley sync round started");
        Ok(())
    }

    fn finish_berkeley_round(&mut self) -> Result<()> {
        let round = match self.pending_berkeley.take() {
            Some(round) => round,
            None => return Ok(()),
        };
        let offset = round.finish();
        self.physical.adjust(offset);

        let clock = self.clock.tick();
        let adjust = ClockSyncMessage::Adjust {
            from: self.settings.server_name.clone(),
            offset,
            clock,
            timestamp: self.physical.now(),
        };
        let payload = agora_wire::encode(&adjust)?;
        self.sockets.publish(topic::SERVERS, &payload)?;
        info!(offset, "berkeley sync round complete");
        Ok(())
    }

    // ---- timers ------------------------------------------------------

    fn tick_timers(&mut self) -> Result<()> {
        let now = Instant::now();

        let heartbeat_timeout = Duration::from_secs(self.settings.election_timeout_secs);
        if self.election.heartbeat_is_stale(now, heartbeat_timeout) {
            info!("coordinator heartbeat timed out, starting election");
            self.refresh_servers();
            let effects = self.election.start_election(&self.servers);
            self.apply_election_effects(effects)?;
        }

        let resolution_timeout = Duration::from_secs(self.settings.election_response_timeout_secs);
        let effects = self.election.on_election_timeout_tick(now, resolution_timeout);
        self.apply_election_effects(effects)?;

        let heartbeat_interval = Duration::from_secs(self.settings.heartbeat_interval_secs);
        let effects = self.election.on_heartbeat_emit_tick(now, heartbeat_interval);
        self.apply_election_effects(effects)?;

        let due = matches!(&self.pending_berkeley, Some(round) if round.is_due(now));
        if due {
            self.finish_berkeley_round()?;
        }

        Ok(())
    }
}
