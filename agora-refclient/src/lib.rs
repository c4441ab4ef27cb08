use agora_core::Error;
use agora_wire::reference::{
    ListRequest, ListResponse, PeerInfo, RankRequest, RankResponse, UNREACHABLE_RANK,
};
use tracing::warn;

const RECV_TIMEOUT_MS: i32 = 5_000;

/// Blocking REQ client wrapping the cluster reference server's `rank` and
/// `list` services. A REQ socket that times out mid-exchange is left in an
/// invalid state by design (ZeroMQ's strict req/rep turn-taking), so a
/// fresh socket is opened for every call rather than retried in place.
pub struct ReferenceClient {
    ctx: zmq::Context,
    endpoint: String,
}

impl ReferenceClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            ctx: zmq::Context::new(),
            endpoint: endpoint.into(),
        }
    }

    fn socket(&self) -> Result<zmq::Socket, Error> {
        let socket = self.ctx.socket(zmq::REQ)?;
        socket.set_rcvtimeo(RECV_TIMEOUT_MS)?;
        socket.set_linger(0)?;
        socket.connect(&self.endpoint)?;
        Ok(socket)
    }

    /// Ask the reference server for this node's election rank. Falls back
    /// to [`UNREACHABLE_RANK`] (losing every election) if the reference
    /// server doesn't answer within the deadline.
    pub fn rank(&self, name: &str, timestamp: f64, clock: u64) -> (u32, u64) {
        match self.rank_inner(name, timestamp, clock) {
            Ok((rank, clock)) => (rank, clock),
            Err(err) => {
                warn!(error = %err, "reference server unreachable, falling back to rank {}", UNREACHABLE_RANK);
                (UNREACHABLE_RANK, clock)
            }
        }
    }

    fn rank_inner(&self, name: &str, timestamp: f64, clock: u64) -> Result<(u32, u64), Error> {
        let socket = self.socket()?;
        let req = RankRequest::new(name, timestamp, clock);
        socket.send(&agora_wire::encode(&req)?, 0)?;
        let bytes = socket.recv_bytes(0)?;
        let reply: RankResponse = agora_wire::decode(&bytes)?;
        Ok((reply.data.rank, reply.data.clock))
    }

    /// List the peers the reference server currently knows about. Returns
    /// an empty list (not an error) if the reference server is
    /// unreachable, since an election can still proceed with zero known
    /// peers (the node just elects itself).
    pub fn list(&self, timestamp: f64, clock: u64) -> (Vec<PeerInfo>, u64) {
        match self.list_inner(timestamp, clock) {
            Ok((peers, clock)) => (peers, clock),
            Err(err) => {
                warn!(error = %err, "reference server unreachable, assuming no known peers");
                (Vec::new(), clock)
            }
        }
    }

    fn list_inner(&self, timestamp: f64, clock: u64) -> Result<(Vec<PeerInfo>, u64), Error> {
        let socket = self.socket()?;
        let req = ListRequest::new(timestamp, clock);
        socket.send(&agora_wire::encode(&req)?, 0)?;
        let bytes = socket.recv_bytes(0)?;
        let reply: ListResponse = agora_wire::decode(&bytes)?;
        Ok((reply.data.list, reply.data.clock))
    }
}
