//! Banner composition: turns a loaded profile into an ordered sequence of
//! draw operations and rasterizes them onto the variant template.

use std::collections::HashMap;

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiError, DataSource, Region, WarfaceApi};
use crate::assets::{AssetError, AssetStore};
use crate::locale::{Bundle, Lang};
use crate::profile::{AchievementKind, Profile, ProfilePatch};
use crate::render;

// Statistics column geometry: right edge and line pitch.
const STATS_X: i32 = 317;
const STATS_Y: i32 = 12;
const STATS_STEP: i32 = 7;

/// Which banner layout to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    User,
    /// Invite banner. No dedicated layout yet; renders the common
    /// profile/rank block on the `join` template.
    Join,
    Clan,
}

impl Variant {
    /// Base template asset name.
    pub fn template(self) -> &'static str {
        match self {
            Variant::User => "user",
            Variant::Join => "join",
            Variant::Clan => "clan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontColor {
    Yellow,
    White,
}

impl FontColor {
    pub(crate) fn rgba(self) -> image::Rgba<u8> {
        match self {
            FontColor::Yellow => image::Rgba([255, 204, 0, 255]),
            FontColor::White => image::Rgba([255, 255, 255, 255]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    /// `x` is the right edge; the rasterizer shifts the run left by its
    /// measured width.
    Right,
}

/// One element of the composition sequence. Ops are applied strictly in
/// order; later ops may overlap earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Composite a named asset, optionally cropped to a source tile
    /// and/or scaled to fit a bounding box (aspect ratio preserved).
    Sprite {
        asset: String,
        /// (x, y, width, height) source tile.
        crop: Option<(u32, u32, u32, u32)>,
        /// (max width, max height) to fit within.
        fit: Option<(u32, u32)>,
        at: (u32, u32),
    },
    Text {
        text: String,
        color: FontColor,
        px: f32,
        align: Align,
        at: (i32, i32),
    },
}

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("fetch: {0}")]
    Fetch(#[from] ApiError),
    #[error("asset: {0}")]
    Asset(#[from] AssetError),
    #[error("incorrect achievement type: {0}")]
    AchievementKind(String),
    #[error("no {kind} achievement {id} in the catalog")]
    CatalogMiss { kind: AchievementKind, id: u64 },
    #[error("rank {0} has no tile in the rank sheet")]
    Rank(u32),
    #[error("crop {w}x{h}+{x}+{y} is outside {asset}")]
    Crop {
        asset: String,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    },
    #[error("image: {0}")]
    Image(String),
    #[error("no profile loaded")]
    NoProfile,
}

/// Banner composer: one rendering session over a loaded profile.
///
/// The composer only reads the profile and the localization bundle; the
/// canvas of an in-flight [`create`](Userbar::create) call is exclusively
/// owned and handed to the caller on success.
pub struct Userbar<D = WarfaceApi> {
    source: D,
    lang: Lang,
    bundle: Bundle,
    assets: AssetStore,
    profile: Option<Profile>,
    achievements: Option<HashMap<String, u64>>,
}

impl Userbar<WarfaceApi> {
    pub fn new(region: Region, assets: AssetStore) -> Self {
        Self::with_source(WarfaceApi::new(region), region.lang(), assets)
    }
}

impl<D: DataSource> Userbar<D> {
    /// Compose over a custom data source, e.g. a stub in tests.
    pub fn with_source(source: D, lang: Lang, assets: AssetStore) -> Self {
        Self {
            source,
            lang,
            bundle: Bundle::new(lang),
            assets,
            profile: None,
            achievements: None,
        }
    }

    /// Fetch statistics for a player and stamp the requested server onto
    /// the record. Not retried here.
    pub fn load(&mut self, name: &str, server: u32) -> Result<(), DrawError> {
        let mut profile = self.source.fetch_statistics(name, server)?;
        profile.server = server;
        debug!(nickname = %profile.nickname, server, "profile loaded");
        self.profile = Some(profile);
        Ok(())
    }

    /// Merge caller overrides into the loaded profile.
    pub fn edit(&mut self, patch: ProfilePatch) -> Result<(), DrawError> {
        self.profile
            .as_mut()
            .ok_or(DrawError::NoProfile)?
            .apply(patch);
        Ok(())
    }

    /// Replace the attached achievement list wholesale; no merge.
    pub fn attach_achievements(&mut self, list: HashMap<String, u64>) {
        self.achievements = Some(list);
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Compose the banner for a variant.
    pub fn create(&self, variant: Variant) -> Result<RgbaImage, DrawError> {
        let mut canvas = self.assets.load(variant.template())?.to_rgba8();
        let ops = self.plan(variant)?;
        debug!(?variant, ops = ops.len(), "composing userbar");
        for op in &ops {
            render::apply(&self.assets, &mut canvas, op)?;
        }
        Ok(canvas)
    }

    /// [`create`](Self::create), PNG-encoded.
    pub fn create_png(&self, variant: Variant) -> Result<Vec<u8>, DrawError> {
        let canvas = self.create(variant)?;
        render::encode_png(&canvas)
    }

    /// The op sequence for a variant, in application order: achievements
    /// first, then variant-specific content, then the profile text block
    /// and rank icon on top.
    ///
    /// Fetches the achievement catalog when a list is attached; pure
    /// otherwise. The base template is not part of the sequence.
    pub fn plan(&self, variant: Variant) -> Result<Vec<DrawOp>, DrawError> {
        let mut ops = Vec::new();

        if let Some(list) = &self.achievements {
            if variant != Variant::Clan {
                self.achievement_ops(list, &mut ops)?;
            }
        }

        match variant {
            Variant::User => {
                self.statistics_ops(&mut ops)?;
                self.type_ops(&mut ops);
            }
            Variant::Join | Variant::Clan => {}
        }

        if variant != Variant::Clan {
            self.profile_ops(&mut ops)?;
            self.rank_ops(&mut ops)?;
        }

        Ok(ops)
    }

    fn achievement_ops(
        &self,
        list: &HashMap<String, u64>,
        ops: &mut Vec<DrawOp>,
    ) -> Result<(), DrawError> {
        let catalog = self.source.fetch_achievement_catalog()?;

        let mut resolved = Vec::with_capacity(list.len());
        for (name, &id) in list {
            let kind = AchievementKind::parse(name)
                .ok_or_else(|| DrawError::AchievementKind(name.clone()))?;
            let icon = catalog
                .icon(kind, id)
                .ok_or(DrawError::CatalogMiss { kind, id })?;
            resolved.push((kind, basename(icon).to_string()));
        }
        // Stripe under badge under mark, regardless of list order.
        resolved.sort_by_key(|e| e.0);

        for (kind, asset) in resolved {
            let (fit, at) = match kind {
                AchievementKind::Stripe => ((256, 64), (29, 1)),
                AchievementKind::Badge | AchievementKind::Mark => ((64, 64), (0, 0)),
            };
            ops.push(DrawOp::Sprite {
                asset,
                crop: None,
                fit: Some(fit),
                at,
            });
        }
        Ok(())
    }

    fn statistics_ops(&self, ops: &mut Vec<DrawOp>) -> Result<(), DrawError> {
        let profile = self.profile.as_ref().ok_or(DrawError::NoProfile)?;

        let lines = [
            format!("{} {}.", profile.playtime_h, self.bundle.hours),
            self.bundle
                .class_label(profile.favorite_pve.as_deref())
                .to_string(),
            profile.pve_wins.to_string(),
            self.bundle
                .class_label(profile.favorite_pvp.as_deref())
                .to_string(),
            profile.pvp_all.to_string(),
            profile.pvp.to_string(),
        ];

        for (i, text) in lines.into_iter().enumerate() {
            ops.push(DrawOp::Text {
                text,
                color: FontColor::Yellow,
                px: 7.0,
                align: Align::Right,
                at: (STATS_X, STATS_Y + i as i32 * STATS_STEP),
            });
        }
        Ok(())
    }

    fn type_ops(&self, ops: &mut Vec<DrawOp>) {
        ops.push(DrawOp::Sprite {
            asset: format!("type_{}", self.lang.initial()),
            crop: None,
            fit: None,
            at: (297, 14),
        });
    }

    fn profile_ops(&self, ops: &mut Vec<DrawOp>) -> Result<(), DrawError> {
        let profile = self.profile.as_ref().ok_or(DrawError::NoProfile)?;

        let mut offset = 0;
        if let Some(clan) = &profile.clan_name {
            ops.push(DrawOp::Text {
                text: clan.clone(),
                color: FontColor::Yellow,
                px: 12.0,
                align: Align::Left,
                at: (102, 23),
            });
            offset = 5;
        }

        ops.push(DrawOp::Text {
            text: profile.nickname.clone(),
            color: FontColor::White,
            px: 14.0,
            align: Align::Left,
            at: (102, 32 + offset),
        });

        // Unmapped server ids degrade to an empty name.
        let server = self.bundle.server_name(profile.server).unwrap_or_default();
        ops.push(DrawOp::Text {
            text: format!("{}: {}", self.bundle.server, server),
            color: FontColor::White,
            px: 12.0,
            align: Align::Left,
            at: (102, 45 + offset),
        });
        Ok(())
    }

    fn rank_ops(&self, ops: &mut Vec<DrawOp>) -> Result<(), DrawError> {
        let profile = self.profile.as_ref().ok_or(DrawError::NoProfile)?;

        // rank_id is 1-based; 0 has no tile, and a tile past the sheet end
        // is rejected when the op is applied.
        let tile_y = profile
            .rank_id
            .checked_sub(1)
            .and_then(|r| r.checked_mul(32))
            .ok_or(DrawError::Rank(profile.rank_id))?;

        ops.push(DrawOp::Sprite {
            asset: "ranks".to_string(),
            crop: Some((0, tile_y, 32, 32)),
            fit: None,
            at: (64, 18),
        });
        Ok(())
    }
}

/// Final path segment of a catalog icon reference.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
