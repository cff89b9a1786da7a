use std::sync::Arc;

use clap::Parser;
use stats_monitor::{
    actors::collector::{CollectorHandle, StatsCollector},
    alerts::FanoutSink,
    config::{MonitorConfig, read_config_file},
    transport::HttpTransport,
};
use tracing::{debug, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON); built-in defaults are used when omitted
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("stats_monitor", LevelFilter::TRACE),
        ("monitor", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => MonitorConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    let sink = FanoutSink::from_config(&config);
    debug!(
        "monitoring {} every {}s with {} alert destinations",
        config.url,
        config.interval,
        sink.len()
    );

    let collector = StatsCollector::new(
        &config,
        Arc::new(HttpTransport::default()),
        Arc::new(sink),
    );
    let handle = CollectorHandle::spawn(collector);

    tokio::signal::ctrl_c().await?;
    debug!("received Ctrl-C, shutting down");
    handle.shutdown().await?;

    Ok(())
}
