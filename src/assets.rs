//! Named-asset resolution: variant templates, the rank sheet, type badges,
//! achievement icons and the banner font, all read from one directory.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use rusttype::Font;
use thiserror::Error;

/// File name of the font every text op is rasterized with.
pub const FONT_FILE: &str = "userbar.ttf";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unknown asset: {0}")]
    NotFound(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("font {0} did not parse")]
    Font(String),
}

/// Directory-backed store of the images a userbar is composed from.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `USERBAR_ASSET_DIR`, falling back to `assets`.
    pub fn from_env() -> Self {
        let dir = std::env::var("USERBAR_ASSET_DIR").unwrap_or_else(|_| "assets".to_string());
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve and decode a named image. Names without an extension refer
    /// to PNG files; catalog icon basenames keep whatever extension the
    /// catalog carried.
    pub fn load(&self, name: &str) -> Result<DynamicImage, AssetError> {
        let file = if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{name}.png")
        };
        let path = self.dir.join(file);
        if !path.is_file() {
            return Err(AssetError::NotFound(name.to_string()));
        }
        let bytes = std::fs::read(&path)?;
        Ok(image::load_from_memory(&bytes)?)
    }

    /// Parse the banner font. Handles are created per call, never pooled.
    pub fn font(&self) -> Result<Font<'static>, AssetError> {
        let path = self.dir.join(FONT_FILE);
        if !path.is_file() {
            return Err(AssetError::NotFound(FONT_FILE.to_string()));
        }
        let bytes = std::fs::read(path)?;
        Font::try_from_vec(bytes).ok_or_else(|| AssetError::Font(FONT_FILE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn loads_extensionless_names_as_png() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("user.png"))
            .unwrap();

        let store = AssetStore::new(dir.path());
        let img = store.load("user").unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
    }

    #[test]
    fn keeps_explicit_extensions() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]))
            .save(dir.path().join("stripe_alpha.png"))
            .unwrap();

        let store = AssetStore::new(dir.path());
        assert!(store.load("stripe_alpha.png").is_ok());
    }

    #[test]
    fn missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        match store.load("ranks") {
            Err(AssetError::NotFound(name)) => assert_eq!(name, "ranks"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_font_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        assert!(matches!(store.font(), Err(AssetError::NotFound(_))));
    }
}
