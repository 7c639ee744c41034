//! Embed renderer — turns an event + lifecycle snapshot into the Discord
//! message payload. Phase drives both the wording and the embed color.

use chrono::FixedOffset;
use serde_json::json;

use raidwatch_core::catalog::{EventClass, RaidEvent};
use raidwatch_scheduler::sink::{AlertRenderer, AlertView, RenderedAlert};
use raidwatch_scheduler::status::Phase;

use crate::assets::AssetCatalog;

const COLOR_UPCOMING: u32 = 0xFF0000;
const COLOR_STARTING: u32 = 0xFFFF00;
const COLOR_ONGOING: u32 = 0x00FF00;
const COLOR_FINISHED: u32 = 0x808080;

/// Renders alerts as a mention line plus a rich embed with boss artwork and
/// the area map.
pub struct EmbedRenderer {
    role_tag: Option<String>,
    assets: AssetCatalog,
    display_offset: FixedOffset,
}

impl EmbedRenderer {
    pub fn new(role_id: &str, assets: AssetCatalog, display_offset: FixedOffset) -> Self {
        let role_tag = (!role_id.is_empty()).then(|| format!("<@&{role_id}>"));
        Self {
            role_tag,
            assets,
            display_offset,
        }
    }
}

impl AlertRenderer for EmbedRenderer {
    fn render(&self, event: &RaidEvent, view: &AlertView) -> RenderedAlert {
        let timing = match view.phase {
            Phase::Upcoming | Phase::Starting => {
                format!("Starts in {}", minutes_label(view.minutes))
            }
            Phase::Ongoing => format!("Started {} ago", minutes_label(view.minutes)),
            Phase::Finished => "Raid finished".to_string(),
        };
        let color = match view.phase {
            Phase::Upcoming => COLOR_UPCOMING,
            Phase::Starting => COLOR_STARTING,
            Phase::Ongoing => COLOR_ONGOING,
            Phase::Finished => COLOR_FINISHED,
        };
        let status_icon = match view.phase {
            Phase::Upcoming | Phase::Starting => "⏳",
            Phase::Ongoing => "⚔️",
            Phase::Finished => "✅",
        };

        // Discord caches images per-URL, so edits carry a version stamp.
        let version = view.now.timestamp();
        let icon = event
            .artwork
            .clone()
            .unwrap_or_else(|| self.assets.icon_url(&event.display_name, version));

        let local_time = view
            .scheduled
            .with_timezone(&self.display_offset)
            .format("%H:%M");

        let mut embed = json!({
            "title": event.display_name,
            "color": color,
            "fields": [
                { "name": "📍 Location", "value": event.location, "inline": true },
                { "name": "⏰ Time", "value": format!("{local_time}"), "inline": true },
                { "name": format!("{status_icon} Status"), "value": timing, "inline": false },
            ],
            "thumbnail": { "url": icon },
            "footer": { "text": "RaidWatch" },
        });
        if let Some(map) = self.assets.map_url(&event.location, version) {
            embed["image"] = json!({ "url": map });
        }

        let headline = match view.phase {
            Phase::Upcoming | Phase::Starting => format!(
                "**{}** | Starts in {}!",
                event.display_name.to_uppercase(),
                minutes_label(view.minutes)
            ),
            Phase::Ongoing => format!(
                "**{}** | Started {} ago!",
                event.display_name.to_uppercase(),
                minutes_label(view.minutes)
            ),
            Phase::Finished => {
                format!("**{}** | Raid finished!", event.display_name.to_uppercase())
            }
        };

        let mut content = String::new();
        if let Some(tag) = &self.role_tag {
            // Spoiler bars keep the mention ping without cluttering the message.
            content.push_str(&format!("||{tag}||\n"));
        }
        if view.class == EventClass::Drill {
            content.push_str("🧪 ");
        }
        content.push_str(&headline);

        RenderedAlert { content, embed }
    }
}

fn minutes_label(minutes: i64) -> String {
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{minutes} minutes")
    }
}
