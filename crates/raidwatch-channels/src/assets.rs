//! Asset URL construction for embed artwork: boss icons and area map images.
//!
//! Map images on the wiki are named by the Korean area name with whitespace
//! removed, so English locations go through a small translation table first.

use raidwatch_core::config::AssetsConfig;

/// Resolves icon and map URLs from the configured asset bases.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    icon_base: String,
    media_base: String,
}

impl AssetCatalog {
    pub fn new(icon_base_url: &str, media_base_url: &str) -> Self {
        Self {
            icon_base: icon_base_url.trim_end_matches('/').to_string(),
            media_base: media_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(assets: &AssetsConfig) -> Self {
        Self::new(&assets.icon_base_url, &assets.media_base_url)
    }

    /// Boss icon URL. Uses the custom icon base when configured, otherwise the
    /// wiki's digimon artwork path. `version` busts Discord's image cache so
    /// edits refresh the thumbnail.
    pub fn icon_url(&self, boss_name: &str, version: i64) -> String {
        let safe = boss_name.replace(':', "_");
        if self.icon_base.is_empty() {
            format!("{}/digimon/{safe}/{safe}.webp?v={version}", self.media_base)
        } else {
            format!("{}/{safe}.png?v={version}", self.icon_base)
        }
    }

    /// Area map image URL, or `None` for locations the wiki has no map for.
    pub fn map_url(&self, location: &str, version: i64) -> Option<String> {
        let korean = translate_location(location)?;
        // The unknown-area bosses all spawn in the Apocalymon zone.
        if korean == "???" {
            return Some(format!(
                "{}/map/ApocalymonArea.webp?v={version}",
                self.media_base
            ));
        }
        let file: String = korean.split_whitespace().collect();
        Some(format!("{}/map/{file}.webp?v={version}", self.media_base))
    }
}

fn translate_location(location: &str) -> Option<&'static str> {
    match location {
        "Shibuya" => Some("시부야"),
        "Valley of Darkness" => Some("어둠성 계곡"),
        "Campground" => Some("캠핑장"),
        "Subway Station" => Some("지하철 역"),
        "Gear Savannah" => Some("기어 사바나"),
        "???" => Some("???"),
        _ => None,
    }
}
