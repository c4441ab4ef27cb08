pub mod berkeley;
pub mod config;
pub mod election;
pub mod handlers;
pub mod node;
pub mod persistence;
pub mod replication;
pub mod state;
pub mod transport;

pub use config::Settings;
pub use node::Node;
