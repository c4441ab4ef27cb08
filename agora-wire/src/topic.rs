pub const REPLICATION: &str = "replication";
pub const SERVERS: &str = "servers";

pub fn private(user: &str) -> String {
    format!("private_{user}")
}

pub fn channel(name: &str) -> String {
    name.to_string()
}
