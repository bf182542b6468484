use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

use super::BrokerBackend;

/// Command-line arguments for the todo service binary.
#[derive(Debug, Parser)]
#[command(name = "todo-service", version, about = "Todo CRUD service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TODO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Select the cache and pub/sub backend.
    #[arg(long = "broker-backend", value_name = "BACKEND", value_enum)]
    pub broker_backend: Option<BrokerBackend>,

    /// Override the Redis connection URL.
    #[arg(long = "broker-url", value_name = "URL")]
    pub broker_url: Option<String>,

    /// Toggle change notifications.
    #[arg(
        long = "pubsub-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub pubsub_enabled: Option<bool>,

    /// Override the channel change notifications are published on.
    #[arg(long = "pubsub-channel", value_name = "CHANNEL")]
    pub pubsub_channel: Option<String>,
}
