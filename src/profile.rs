//! The typed player record and its override/achievement inputs.

use serde::{Deserialize, Deserializer};

/// One player's statistics as returned by the game API.
///
/// Numeric fields the API may omit decode to 0; a missing or `false`
/// clan name decodes to `None`. Defaults are resolved here, at decode
/// time, so the draw steps read plain values.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub nickname: String,
    #[serde(default, deserialize_with = "clan_name")]
    pub clan_name: Option<String>,
    /// Stamped from the requested server at load time.
    #[serde(default)]
    pub server: u32,
    #[serde(default)]
    pub playtime_h: u64,
    #[serde(default)]
    pub pve_wins: u64,
    #[serde(default)]
    pub pvp_all: u64,
    #[serde(default)]
    pub pvp: u64,
    #[serde(rename = "favoritPVE")]
    pub favorite_pve: Option<String>,
    #[serde(rename = "favoritPVP")]
    pub favorite_pvp: Option<String>,
    /// 1-based row in the rank sheet. 0 (the missing-field default) has
    /// no tile and is rejected by the composer.
    #[serde(default)]
    pub rank_id: u32,
}

/// The API encodes "no clan" as the boolean `false` instead of omitting
/// the field.
fn clan_name<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(name) => Ok(Some(name)),
        _ => Ok(None),
    }
}

/// Caller overrides for a loaded [`Profile`]; only populated fields are
/// applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub nickname: Option<String>,
    pub clan_name: Option<String>,
    pub server: Option<u32>,
    pub playtime_h: Option<u64>,
    pub pve_wins: Option<u64>,
    pub pvp_all: Option<u64>,
    pub pvp: Option<u64>,
    #[serde(rename = "favoritPVE")]
    pub favorite_pve: Option<String>,
    #[serde(rename = "favoritPVP")]
    pub favorite_pvp: Option<String>,
    pub rank_id: Option<u32>,
}

impl Profile {
    /// Merge a patch: populated fields overwrite, empty ones are ignored.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(v) = patch.nickname {
            self.nickname = v;
        }
        if let Some(v) = patch.clan_name {
            self.clan_name = Some(v);
        }
        if let Some(v) = patch.server {
            self.server = v;
        }
        if let Some(v) = patch.playtime_h {
            self.playtime_h = v;
        }
        if let Some(v) = patch.pve_wins {
            self.pve_wins = v;
        }
        if let Some(v) = patch.pvp_all {
            self.pvp_all = v;
        }
        if let Some(v) = patch.pvp {
            self.pvp = v;
        }
        if let Some(v) = patch.favorite_pve {
            self.favorite_pve = Some(v);
        }
        if let Some(v) = patch.favorite_pvp {
            self.favorite_pvp = Some(v);
        }
        if let Some(v) = patch.rank_id {
            self.rank_id = v;
        }
    }
}

/// The three decoration slots a userbar can carry. Declaration order is
/// the draw order: stripe under badge under mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AchievementKind {
    Stripe,
    Badge,
    Mark,
}

impl AchievementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementKind::Stripe => "stripe",
            AchievementKind::Badge => "badge",
            AchievementKind::Mark => "mark",
        }
    }

    /// Parse a caller-supplied kind name. Anything outside the three
    /// slots is a data error, surfaced by the composer.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "stripe" => Some(Self::Stripe),
            "badge" => Some(Self::Badge),
            "mark" => Some(Self::Mark),
            _ => None,
        }
    }
}

impl std::fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
