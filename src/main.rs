#![forbid(unsafe_code)]

//! `mcpwebkit` standalone server.
//!
//! Serves the MCP surface until interrupted. Without an embedding host
//! there is no page to script, so script-backed tools answer with a
//! capability error.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use mcpwebkit::{AppError, McpServer, Result, ServerConfig};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "mcpwebkit", about = "MCP control-plane server", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Bind address, overriding `host` from the config file.
    #[arg(long)]
    host: Option<String>,

    /// Preferred port, overriding `port` from the config file.
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Fallback attempts after the preferred port is taken.
    #[arg(long)]
    max_port_retries: Option<u16>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn server_config(&self) -> Result<ServerConfig> {
        let mut config = match self.config {
            Some(ref path) => ServerConfig::load_from_path(path)?,
            None => ServerConfig::default(),
        };
        if let Some(ref host) = self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(retries) = self.max_port_retries {
            config.max_port_retries = retries;
        }
        config.host_addr()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = cli.server_config()?;
    info!(?config, "configuration loaded");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Io(format!("tokio runtime: {err}")))?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<()> {
    let mut server = McpServer::new(config);
    let port = server.start().await?;
    info!(port, "ready; POST JSON-RPC to /mcp");

    let signal = wait_for_signal().await;
    info!(signal, "stopping");
    server.stop().await;
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix, naming the signal received.
async fn wait_for_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            },
            Err(err) => {
                warn!(%err, "SIGTERM handler unavailable");
                ctrl_c().await
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await
    }
}

async fn ctrl_c() -> &'static str {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "ctrl-c handler failed");
    }
    "ctrl-c"
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| AppError::Config(format!("tracing subscriber: {err}")))
}
