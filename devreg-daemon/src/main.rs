//! Entrypoint: loads configuration, brings up a simulated discovery
//! plugin against an in-memory device registry, and exposes a read-only
//! HTTP query surface over it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use devreg_core::Registry;
use devreg_device::SimDevice;

mod config;
mod discovery;
mod events;
mod http;

use config::Config;

#[derive(Parser, Debug)]
#[command(version, author, about = "Diagnostic device registry daemon")]
struct Opts {
    /// Verbosity level: -v for debug, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to an alternate configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured HTTP bind address.
    #[arg(long)]
    bind_address: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(opts: &Opts) -> anyhow::Result<Config> {
    let mut config: Config = match &opts.config {
        Some(path) => confy::load_path(path).context("loading config file")?,
        None => confy::load("devreg-daemon", None).context("loading config file")?,
    };

    if let Some(bind_address) = &opts.bind_address {
        config
            .http_server
            .get_or_insert_with(Default::default)
            .bind_address = Some(bind_address.clone());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    let config = load_config(&opts)?;

    let registry: Registry<SimDevice> = Registry::new();
    let (event_log, _subscriptions) = events::attach(&registry);

    let devices: Vec<_> = config
        .simulated_devices
        .iter()
        .map(|device| {
            let mut builder = SimDevice::builder(device.id.clone())
                .name(device.name.clone())
                .remove_delay(Duration::from_secs(device.remove_delay_secs));
            if let Some(guid) = &device.guid {
                builder = builder.guid(guid.clone());
            }
            builder.build()
        })
        .collect();

    log::info!(
        "starting with {} simulated device(s)",
        devices.len()
    );

    let discovery_registry = registry.clone();
    tokio::spawn(discovery::simulated_discovery_task(
        discovery_registry,
        devices,
    ));

    if let Some(http_server) = config.http_server {
        http::serve(http_server, registry, event_log).await?;
    } else {
        log::warn!("no http_server configured, idling");
        std::future::pending::<()>().await;
    }

    Ok(())
}
