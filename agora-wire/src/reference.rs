use serde::{Deserialize, Serialize};

/// A peer entry as returned by the reference server's `list` service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerInfo {
    pub name: String,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankRequestData {
    pub user: String,
    pub timestamp: f64,
    pub clock: u64,
}

/// Request envelope: `{service:"rank", data:{user, timestamp, clock}}`.
#[derive(Debug, Clone, Serialize)]
pub struct RankRequest {
    pub service: &'static str,
    pub data: RankRequestData,
}

impl RankRequest {
    pub fn new(user: impl Into<String>, timestamp: f64, clock: u64) -> Self {
        Self {
            service: "rank",
            data: RankRequestData {
                user: user.into(),
                timestamp,
                clock,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankResponseData {
    pub rank: u32,
    pub clock: u64,
}

/// Reply envelope: `{data:{rank, clock}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RankResponse {
    pub data: RankResponseData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRequestData {
    pub timestamp: f64,
    pub clock: u64,
}

/// Request envelope: `{service:"list", data:{timestamp, clock}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ListRequest {
    pub service: &'static str,
    pub data: ListRequestData,
}

impl ListRequest {
    pub fn new(timestamp: f64, clock: u64) -> Self {
        Self {
            service: "list",
            data: ListRequestData { timestamp, clock },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListResponseData {
    pub list: Vec<PeerInfo>,
    pub clock: u64,
}

/// Reply envelope: `{data:{list:[{name, rank}...], clock}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    pub data: ListResponseData,
}

/// Sentinel rank assigned when the reference server is unreachable within
/// the deadline: the node still functions, just loses every election.
pub const UNREACHABLE_RANK: u32 = 999;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_request_nests_fields_under_data() {
        let req = RankRequest::new("alice", 0.0, 3);
        let bytes = rmp_serde::to_vec_named(&req).unwrap();
        let value = rmpv::decode::read_value(&mut std::io::Cursor::new(bytes)).unwrap();
        let map = value.as_map().unwrap();
        assert!(map.iter().any(|(k, _)| k.as_str() == Some("service")));
        assert!(map.iter().any(|(k, _)| k.as_str() == Some("data")));
    }
}
