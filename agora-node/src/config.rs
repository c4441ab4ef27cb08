use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use agora_core::Error;

/// Runtime configuration for a cluster node.
///
/// Loaded from (lowest to highest precedence): built-in defaults, an
/// optional config file, `AGORA_*` environment variables, and finally CLI
/// flags. `SERVER_NAME` is the one exception, kept bare (unprefixed) to
/// match the reference server's registration protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server_name: String,
    pub broker_endpoint: String,
    pub proxy_in_endpoint: String,
    pub proxy_out_endpoint: String,
    pub reference_endpoint: String,
    pub data_dir: PathBuf,
    pub poll_timeout_ms: i64,
    pub heartbeat_interval_secs: u64,
    pub election_timeout_secs: u64,
    pub election_response_timeout_secs: u64,
    /// Run a Berkeley sync round every this-many client requests
    /// processed while this node believes itself coordinator.
    pub berkeley_sync_threshold: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            broker_endpoint: "tcp://127.0.0.1:5555".to_string(),
            proxy_in_endpoint: "tcp://127.0.0.1:5556".to_string(),
            proxy_out_endpoint: "tcp://127.0.0.1:5557".to_string(),
            reference_endpoint: "tcp://127.0.0.1:5558".to_string(),
            data_dir: PathBuf::from("./data"),
            poll_timeout_ms: 1_000,
            heartbeat_interval_secs: 5,
            election_timeout_secs: 15,
            election_response_timeout_secs: 3,
            berkeley_sync_threshold: 10,
        }
    }
}

fn default_server_name() -> String {
    std::env::var("SERVER_NAME").unwrap_or_else(|_| {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "node".to_string())
    })
}

/// Command-line overrides. Anything left `None` falls through to the
/// environment/config-file/default layers.
#[derive(Debug, Parser)]
#[command(name = "agora-node", about = "Bulletin-board cluster node")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub broker_endpoint: Option<String>,

    #[arg(long)]
    pub proxy_in_endpoint: Option<String>,

    #[arg(long)]
    pub proxy_out_endpoint: Option<String>,

    #[arg(long)]
    pub reference_endpoint: Option<String>,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self, Error> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default()).map_err(Error::internal)?);

        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::from(path.clone()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("AGORA")
                .separator("_")
                .try_parsing(true),
        );

        let mut settings: Settings = builder
            .build()
            .map_err(Error::internal)?
            .try_deserialize()
            .map_err(Error::internal)?;

        if let Ok(name) = std::env::var("SERVER_NAME") {
            settings.server_name = name;
        }
        if let Some(dir) = &cli.data_dir {
            settings.data_dir = dir.clone();
        }
        if let Some(endpoint) = &cli.broker_endpoint {
            settings.broker_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &cli.proxy_in_endpoint {
            settings.proxy_in_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &cli.proxy_out_endpoint {
            settings.proxy_out_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &cli.reference_endpoint {
            settings.reference_endpoint = endpoint.clone();
        }

        Ok(settings)
    }
}
