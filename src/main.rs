use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_aggregator::{
    config::Config,
    models::ChannelGroups,
    repositories::{ChannelRepository, InMemoryChannelRepository},
    services::ChannelSources,
    sources::SourceDependencies,
};

#[derive(Parser)]
#[command(name = "channel-aggregator")]
#[command(version)]
#[command(about = "Aggregates AceStream playlists and API sources into one channel directory")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (falls back to CONFIG_FILE, then config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Start, print the merged directory as JSON, then stop
    #[arg(long)]
    once: bool,

    /// Source names in priority order (defaults to all, sorted by name)
    #[arg(short, long, value_delimiter = ',')]
    sources: Vec<String>,

    /// Look up a channel by content id once the sources have started
    #[arg(long)]
    find: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("channel_aggregator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting channel aggregator v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load_from_file(path)?;
            info!("Configuration loaded from: {}", path);
            config
        }
        None => Config::load()?,
    };

    if config.sources.is_empty() {
        warn!("No sources configured");
    }

    let groups = Arc::new(ChannelGroups::from_config(&config.groups));
    let repository = Arc::new(InMemoryChannelRepository::new());
    let dependencies = SourceDependencies::from_config(&config, repository.clone())?;
    let sources = ChannelSources::new(config.sources, groups, dependencies)?;

    let query_order = if cli.sources.is_empty() {
        sources.source_names()
    } else {
        cli.sources
    };

    sources.start().await?;

    let directory = sources.query(query_order.as_slice());
    info!(
        "Channel directory ready: {} channels from {} sources",
        directory.len(),
        sources.len()
    );

    if let Some(content_id) = &cli.find {
        match repository.find_by_content_id(content_id).await? {
            Some(channel) => info!("Content id '{}' is channel '{}'", content_id, channel.name),
            None => warn!("No channel with content id '{}'", content_id),
        }
    }

    if cli.once {
        println!("{}", serde_json::to_string_pretty(&directory)?);
    } else {
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        for (name, status) in sources.status() {
            info!(
                "Source '{}': {} channels, last refresh {:?}, last error {:?}",
                name, status.channel_count, status.last_refreshed_at, status.last_error
            );
        }
    }

    sources.stop().await?;
    info!("All sources stopped");

    Ok(())
}
