//! # RaidWatch Channels
//!
//! The outward-facing half of the bot: the Discord webhook notifier sink and
//! the embed renderer (with asset URL construction) plugged into the
//! scheduler's `NotifierSink`/`AlertRenderer` seams.

pub mod assets;
pub mod discord;
pub mod render;

pub use assets::AssetCatalog;
pub use discord::DiscordWebhook;
pub use render::EmbedRenderer;
