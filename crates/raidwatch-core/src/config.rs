//! RaidWatch configuration system.
//!
//! A single TOML file (`~/.raidwatch/config.toml` by default) carries the
//! webhook target, alert thresholds, asset bases, and the event catalog.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RaidWatchError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidWatchConfig {
    /// Discord webhook URL. Falls back to the `DISCORD_WEBHOOK` env var.
    #[serde(default)]
    pub webhook_url: String,
    /// Role id to mention in alerts (empty = no mention).
    #[serde(default)]
    pub role_id: String,
    /// Main loop cadence in seconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Lead window: an alert is created once remaining <= this.
    #[serde(default = "default_creation_threshold")]
    pub creation_threshold_secs: i64,
    /// Minimum seconds between edits of a live alert message.
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: i64,
    /// Retired occurrences are remembered this long before garbage collection.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Offset (hours from UTC) used for human-readable times in messages.
    #[serde(default = "default_display_offset")]
    pub display_offset_hours: i32,
    #[serde(default)]
    pub windows: WindowsConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Event catalog. Empty = built-in defaults.
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

fn default_tick_interval() -> u64 { 5 }
fn default_creation_threshold() -> i64 { 600 }
fn default_update_interval() -> i64 { 60 }
fn default_retention_days() -> i64 { 7 }
fn default_display_offset() -> i32 { -3 }

impl Default for RaidWatchConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            role_id: String::new(),
            tick_interval_secs: default_tick_interval(),
            creation_threshold_secs: default_creation_threshold(),
            update_interval_secs: default_update_interval(),
            retention_days: default_retention_days(),
            display_offset_hours: default_display_offset(),
            windows: WindowsConfig::default(),
            assets: AssetsConfig::default(),
            events: Vec::new(),
        }
    }
}

impl RaidWatchConfig {
    /// Load config from the default path (~/.raidwatch/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RaidWatchError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RaidWatchError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".raidwatch")
            .join("config.toml")
    }

    /// Startup-fatal sanity checks on the threshold set.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_secs == 0 {
            return Err(RaidWatchError::config("tick_interval_secs must be > 0"));
        }
        if self.creation_threshold_secs <= 0 {
            return Err(RaidWatchError::config("creation_threshold_secs must be > 0"));
        }
        if self.update_interval_secs <= 0 {
            return Err(RaidWatchError::config("update_interval_secs must be > 0"));
        }
        if self.retention_days <= 0 {
            return Err(RaidWatchError::config("retention_days must be > 0"));
        }
        if self.display_offset_hours.abs() >= 24 {
            return Err(RaidWatchError::config(
                "display_offset_hours must be within (-24, 24)",
            ));
        }
        self.windows.validate()
    }

    /// The webhook target: config value first, `DISCORD_WEBHOOK` env second.
    pub fn resolve_webhook_url(&self) -> Result<String> {
        if !self.webhook_url.is_empty() {
            return Ok(self.webhook_url.clone());
        }
        match std::env::var("DISCORD_WEBHOOK") {
            Ok(url) if !url.is_empty() => Ok(url),
            _ => Err(RaidWatchError::config(
                "no webhook configured: set webhook_url or the DISCORD_WEBHOOK env var",
            )),
        }
    }

    /// Event specs to schedule: configured ones, or the built-in catalog.
    pub fn event_specs(&self) -> Vec<EventSpec> {
        if self.events.is_empty() {
            default_events()
        } else {
            self.events.clone()
        }
    }
}

/// Lifecycle windows per event class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowsConfig {
    #[serde(default = "default_scheduled_windows")]
    pub scheduled: WindowSpec,
    #[serde(default = "default_drill_windows")]
    pub drill: WindowSpec,
}

/// A (start, grace) window pair in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSpec {
    pub start_window_secs: i64,
    pub grace_window_secs: i64,
}

fn default_scheduled_windows() -> WindowSpec {
    WindowSpec { start_window_secs: 300, grace_window_secs: 300 }
}
fn default_drill_windows() -> WindowSpec {
    WindowSpec { start_window_secs: 120, grace_window_secs: 60 }
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            scheduled: default_scheduled_windows(),
            drill: default_drill_windows(),
        }
    }
}

impl WindowsConfig {
    fn validate(&self) -> Result<()> {
        for w in [&self.scheduled, &self.drill] {
            if w.start_window_secs <= 0 || w.grace_window_secs < 0 {
                return Err(RaidWatchError::config(
                    "window seconds must be positive (grace may be zero)",
                ));
            }
        }
        Ok(())
    }
}

/// Asset URL bases for embed artwork.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Optional base for custom boss icons ({base}/{name}.png).
    #[serde(default)]
    pub icon_base_url: String,
    /// Wiki media base used for fallback icons and map images.
    #[serde(default = "default_media_base")]
    pub media_base_url: String,
}

fn default_media_base() -> String { "https://media.dsrwiki.com/dsrwiki".into() }

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            icon_base_url: String::new(),
            media_base_url: default_media_base(),
        }
    }
}

/// One catalog entry as written in TOML. A single entry may list several
/// times of day; each becomes its own schedule slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    pub name: String,
    #[serde(default)]
    pub location: String,
    /// Times of day, "HH:MM" in the game timezone.
    #[serde(default)]
    pub times: Vec<String>,
    /// "daily", "biweekly", or "rotating".
    #[serde(default = "default_frequency")]
    pub frequency: String,
    /// Cycle anchor, "YYYY-MM-DD". Required for biweekly and rotating.
    #[serde(default)]
    pub anchor_date: Option<String>,
    /// Per-cycle time-of-day shift in minutes (rotating only).
    #[serde(default)]
    pub rotation_minutes: Option<i64>,
    /// Explicit icon URL override.
    #[serde(default)]
    pub artwork: Option<String>,
}

fn default_frequency() -> String { "daily".into() }

/// The built-in boss roster, used when the config lists no events.
pub fn default_events() -> Vec<EventSpec> {
    fn spec(
        name: &str,
        location: &str,
        times: &[&str],
        frequency: &str,
        anchor: Option<&str>,
    ) -> EventSpec {
        EventSpec {
            name: name.into(),
            location: location.into(),
            times: times.iter().map(|t| (*t).into()).collect(),
            frequency: frequency.into(),
            anchor_date: anchor.map(String::from),
            rotation_minutes: None,
            artwork: None,
        }
    }

    vec![
        spec("Pumpkinmon", "Shibuya", &["19:30", "21:30"], "daily", None),
        spec("Gotsumon", "Shibuya", &["23:00", "01:00"], "daily", None),
        spec("BlackSeraphimon", "???", &["23:00"], "biweekly", Some("2025-05-31")),
        spec("Ophanimon: Falldown Mode", "???", &["23:00"], "biweekly", Some("2025-06-07")),
        spec("Megidramon", "???", &["22:00"], "biweekly", Some("2025-06-08")),
        spec("Omnimon", "Valley of Darkness", &["22:00"], "biweekly", Some("2025-06-01")),
        spec("Andromon", "Gear Savannah", &["19:00"], "daily", None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RaidWatchConfig::default();
        assert_eq!(config.tick_interval_secs, 5);
        assert_eq!(config.creation_threshold_secs, 600);
        assert_eq!(config.update_interval_secs, 60);
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.windows.scheduled.start_window_secs, 300);
        assert_eq!(config.windows.drill.start_window_secs, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: RaidWatchConfig = toml::from_str("").unwrap();
        assert_eq!(config.tick_interval_secs, 5);
        assert_eq!(config.assets.media_base_url, "https://media.dsrwiki.com/dsrwiki");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            role_id = "123456"
            creation_threshold_secs = 300

            [[events]]
            name = "Pumpkinmon"
            location = "Shibuya"
            times = ["19:30"]
            frequency = "daily"

            [[events]]
            name = "Omnimon"
            location = "Valley of Darkness"
            times = ["22:00"]
            frequency = "biweekly"
            anchor_date = "2025-06-01"
        "#;

        let config: RaidWatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.role_id, "123456");
        assert_eq!(config.creation_threshold_secs, 300);
        assert_eq!(config.events.len(), 2);
        assert_eq!(config.events[1].anchor_date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn test_empty_events_fall_back_to_builtin() {
        let config = RaidWatchConfig::default();
        let specs = config.event_specs();
        assert_eq!(specs.len(), 7);
        assert!(specs.iter().any(|s| s.name == "Pumpkinmon"));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = RaidWatchConfig::default();
        config.tick_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = RaidWatchConfig::default();
        config.creation_threshold_secs = -1;
        assert!(config.validate().is_err());

        let mut config = RaidWatchConfig::default();
        config.display_offset_hours = 30;
        assert!(config.validate().is_err());
    }
}
