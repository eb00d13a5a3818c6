//! Warface userbar generator.
//!
//! Fetches player statistics from the game API and composes the small
//! banner image ("userbar") summarizing them: base template, achievement
//! decorations, statistics column, localized type badge, profile text
//! block and rank icon.
//!
//! ```no_run
//! use wf_userbar::{AssetStore, Region, Userbar, Variant};
//!
//! # fn main() -> Result<(), wf_userbar::DrawError> {
//! let mut ub = Userbar::new(Region::Ru, AssetStore::from_env());
//! ub.load("Player", 1)?;
//! let png = ub.create_png(Variant::User)?;
//! # let _ = png;
//! # Ok(())
//! # }
//! ```

mod api;
mod assets;
mod draw;
mod locale;
mod profile;
mod render;

pub use api::{ApiError, Catalog, CatalogEntry, DataSource, Region, WarfaceApi};
pub use assets::{AssetError, AssetStore, FONT_FILE};
pub use draw::{Align, DrawError, DrawOp, FontColor, Userbar, Variant};
pub use locale::{Bundle, Lang};
pub use profile::{AchievementKind, Profile, ProfilePatch};
pub use render::encode_png;
