use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::MonitorConfig;

mod broker;
mod error;
mod management;
mod poller;
mod session;
#[cfg(test)]
mod testing;
mod tui;

use crate::broker::AmqpConnector;
use crate::management::{HttpManagement, ManagementApi};

const APP_DIR: &str = "rabbit-monitor";

#[derive(Debug, Parser)]
#[command(name = "rabbit-monitor")]
#[command(about = "Live terminal dashboard for a RabbitMQ broker", version, author)]
struct Cli {
    /// TOML config file (default: <config dir>/rabbit-monitor/config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Broker host, overrides RABBITMQ_HOST
    #[arg(long)]
    host: Option<String>,
    /// Messages kept in memory, overrides MAX_MESSAGES_DISPLAY
    #[arg(long)]
    max_messages: Option<usize>,
    /// Topology refresh period in milliseconds, overrides REFRESH_INTERVAL
    #[arg(long)]
    refresh_ms: Option<u64>,
    /// Where to write logs (default: <data dir>/rabbit-monitor/monitor.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone())?;

    let cfg = load_config(&cli)?;
    info!(?cfg, "configuration loaded");

    let api = Arc::new(HttpManagement::new(&cfg.broker)?);
    match api.overview().await {
        Ok(ov) => info!(
            version = ov.rabbitmq_version.as_deref().unwrap_or("unknown"),
            management = ov.management_version.as_deref().unwrap_or("unknown"),
            cluster = ov.cluster_name.as_deref().unwrap_or("unknown"),
            "management API reachable"
        ),
        Err(e) => {
            error!(error = %e, url = api.base_url(), "initial connectivity check failed");
            eprintln!("Could not reach the RabbitMQ management API at {}: {e}", api.base_url());
            eprintln!("Check that:");
            eprintln!("  - the RabbitMQ broker is running on {}", cfg.broker.host);
            eprintln!("  - the management plugin answers on port {}", cfg.broker.http_port);
            eprintln!("  - the credentials for user \"{}\" are correct", cfg.broker.admin_user);
            std::process::exit(1);
        }
    }

    let connector = Arc::new(AmqpConnector::new(cfg.broker.clone()));
    tui::run_tui(cfg, api, connector).await
}

fn init_logging(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p,
        None => dirs::data_dir()
            .context("data dir")?
            .join(APP_DIR)
            .join("monitor.log"),
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    // The dashboard owns the terminal, so logs only ever go to the file.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// defaults → TOML file → environment → command line
fn load_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let explicit = cli.config.is_some();
    let path = cli
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml")));

    let mut cfg = match path {
        Some(p) if explicit || p.exists() => read_config_file(&p)?,
        _ => MonitorConfig::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    apply_cli(&mut cfg, cli);
    Ok(cfg)
}

fn read_config_file(path: &Path) -> anyhow::Result<MonitorConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    MonitorConfig::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
}

fn apply_cli(cfg: &mut MonitorConfig, cli: &Cli) {
    if let Some(host) = &cli.host {
        cfg.broker.host = host.clone();
    }
    if let Some(n) = cli.max_messages.filter(|n| *n > 0) {
        cfg.display.max_messages = n;
    }
    if let Some(ms) = cli.refresh_ms.filter(|ms| *ms > 0) {
        cfg.display.refresh_interval_ms = ms;
    }
    cfg.normalize();
}
