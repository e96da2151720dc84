//! relaychat terminal client.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a local relay and join straight away
//! relaychat --name Al
//!
//! # Explicit relay URL
//! relaychat --url wss://relay.example/chat --name Al --password hunter2
//!
//! # No network: always use the local demo session
//! relaychat --offline --name Bo
//! ```

use std::{io, time::Duration};

use clap::Parser;
use relaychat_app::WsDriver;
use relaychat_core::{ClientConfig, Endpoint};
use relaychat_cli::{CliError, OfflineDriver, UserInput, shell};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// relaychat terminal client
#[derive(Parser, Debug)]
#[command(name = "relaychat")]
#[command(about = "Chat over a relay, with a local demo session when it is unreachable")]
#[command(version)]
struct Args {
    /// Relay host
    #[arg(long, default_value = relaychat_core::config::DEFAULT_HOST)]
    host: String,

    /// Relay port
    #[arg(short, long, default_value_t = relaychat_core::config::DEFAULT_PORT)]
    port: u16,

    /// Full relay URL; overrides host and port
    #[arg(long)]
    url: Option<String>,

    /// Time allowed to reach the relay before falling back, in milliseconds
    #[arg(long, default_value_t = 5000)]
    connect_timeout_ms: u64,

    /// Longest message, in characters
    #[arg(long, default_value_t = relaychat_core::config::DEFAULT_MAX_MESSAGE_LEN)]
    max_message_len: usize,

    /// Join with this name on startup
    #[arg(short, long)]
    name: Option<String>,

    /// Password for the startup join
    #[arg(long, requires = "name")]
    password: Option<String>,

    /// Never contact a relay
    #[arg(long)]
    offline: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: Endpoint { host: self.host.clone(), port: self.port, url: self.url.clone() },
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            max_message_len: self.max_message_len,
            ..ClientConfig::new()
        }
    }

    fn initial(&self) -> Option<UserInput> {
        self.name
            .as_ref()
            .map(|name| UserInput::Join { name: name.clone(), password: self.password.clone() })
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the conversation; notices and logs go to stderr
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let config = args.config();
    tracing::info!(url = %config.endpoint.url(), offline = args.offline, "relaychat starting");

    let initial = args.initial();
    let stdin = BufReader::new(tokio::io::stdin());
    if args.offline {
        shell::run(OfflineDriver, config, stdin, io::stdout(), io::stderr(), initial, ctrl_c()).await
    } else {
        shell::run(WsDriver::new(), config, stdin, io::stdout(), io::stderr(), initial, ctrl_c())
            .await
    }
}
