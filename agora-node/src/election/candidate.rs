use std::collections::HashSet;
use std::time::Instant;

/// A node running an election, waiting up to the election-response
/// timeout for `election_ok` replies before deciding it has won.
pub struct Candidate {
    pub started_at: Instant,
    pub responses: HashSet<String>,
}

impl Candidate {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            responses: HashSet::new(),
        }
    }
}
