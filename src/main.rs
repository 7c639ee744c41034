//! # RaidWatch — Discord Raid Alert Bot
//!
//! Watches a recurring boss schedule and keeps one live webhook alert per
//! upcoming occurrence: created inside the lead window, edited in place as
//! the raid approaches, retired once it is over.
//!
//! Usage:
//!   raidwatch                              # Run with ~/.raidwatch/config.toml
//!   raidwatch --config ./raidwatch.toml    # Custom config path
//!   raidwatch --drill                      # Also fire test alerts shortly after startup

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use raidwatch_channels::{AssetCatalog, DiscordWebhook, EmbedRenderer};
use raidwatch_core::RaidWatchConfig;
use raidwatch_core::catalog::Catalog;
use raidwatch_scheduler::clock::{Clock, SystemClock};
use raidwatch_scheduler::engine::ScheduleEngine;
use raidwatch_scheduler::lifecycle::{AlertManager, AlertPolicy};
use raidwatch_scheduler::sink::{AlertRenderer, NotifierSink};

/// Startup drill offsets, minutes from now.
const DRILL_OFFSETS: [i64; 2] = [2, 3];

#[derive(Parser)]
#[command(
    name = "raidwatch",
    version,
    about = "⏰ RaidWatch — raid schedule alerts over a Discord webhook"
)]
struct Cli {
    /// Config file path (default: ~/.raidwatch/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Discord webhook URL (overrides config and DISCORD_WEBHOOK)
    #[arg(long)]
    webhook_url: Option<String>,

    /// Schedule short-lived test alerts a few minutes after startup
    #[arg(long)]
    drill: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "raidwatch=debug"
    } else {
        "raidwatch=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            RaidWatchConfig::load_from(std::path::Path::new(&path))?
        }
        None => RaidWatchConfig::load()?,
    };
    config.validate()?;

    // Webhook target: CLI flag first, then config / env
    let webhook_url = match &cli.webhook_url {
        Some(url) => url.clone(),
        None => config.resolve_webhook_url()?,
    };

    // Build the catalog from today's date in the game timezone
    let clock = SystemClock::game_time();
    let now = clock.now();
    let mut catalog = Catalog::from_config(&config, now.date_naive())?;
    if cli.drill {
        catalog.add_drills(now, &DRILL_OFFSETS);
    }

    // Wire the Discord sink and renderer
    let sink: Arc<dyn NotifierSink> = Arc::new(DiscordWebhook::new(&webhook_url)?);
    let display_offset = chrono::FixedOffset::east_opt(config.display_offset_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("invalid display offset"))?;
    let renderer: Arc<dyn AlertRenderer> = Arc::new(EmbedRenderer::new(
        &config.role_id,
        AssetCatalog::from_config(&config.assets),
        display_offset,
    ));

    let policy = AlertPolicy::from_config(&config);
    let manager = AlertManager::new(sink, renderer, policy);
    let tick_interval = std::time::Duration::from_secs(config.tick_interval_secs);

    println!("⏰ RaidWatch v{}", env!("CARGO_PKG_VERSION"));
    println!("   📅 Events:        {}", catalog.len());
    println!("   🔔 Lead window:   {}s", config.creation_threshold_secs);
    println!("   🔁 Tick interval: {}s", config.tick_interval_secs);
    println!("   🕘 Game time now: {}", now.format("%Y-%m-%d %H:%M:%S %z"));
    if cli.drill {
        println!("   🧪 Drills:        {DRILL_OFFSETS:?} minutes from now");
    }
    println!();

    let engine = ScheduleEngine::new(catalog, manager, clock, tick_interval);
    engine.run().await;

    Ok(())
}
