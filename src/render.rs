//! Rasterization of draw ops: sprite compositing and glyph rendering.

use image::{GenericImageView, ImageEncoder, Rgba, RgbaImage};
use rusttype::{point, Font, Scale};

use crate::assets::AssetStore;
use crate::draw::{Align, DrawError, DrawOp};

/// Apply one op to the canvas. Ops must be applied in sequence; later
/// ops overlap earlier ones.
pub(crate) fn apply(
    assets: &AssetStore,
    canvas: &mut RgbaImage,
    op: &DrawOp,
) -> Result<(), DrawError> {
    match op {
        DrawOp::Sprite {
            asset,
            crop,
            fit,
            at,
        } => {
            let mut img = assets.load(asset)?;
            if let Some((x, y, w, h)) = *crop {
                let (iw, ih) = img.dimensions();
                let outside = x.checked_add(w).is_none_or(|r| r > iw)
                    || y.checked_add(h).is_none_or(|b| b > ih);
                if outside {
                    return Err(DrawError::Crop {
                        asset: asset.clone(),
                        x,
                        y,
                        w,
                        h,
                    });
                }
                img = img.crop_imm(x, y, w, h);
            }
            if let Some((w, h)) = *fit {
                img = img.resize(w, h, image::imageops::FilterType::Lanczos3);
            }
            overlay_alpha(canvas, &img.to_rgba8(), at.0, at.1);
        }
        DrawOp::Text {
            text,
            color,
            px,
            align,
            at,
        } => {
            let font = assets.font()?;
            let x = match align {
                Align::Left => at.0 as f32,
                Align::Right => at.0 as f32 - text_width(&font, *px, text),
            };
            draw_text(canvas, &font, *px, x, at.1 as f32, color.rgba(), text);
        }
    }
    Ok(())
}

/// Linear blend of one channel under the given coverage.
fn mix(src: u8, dst: u8, cover: f32) -> u8 {
    (src as f32 * cover + dst as f32 * (1.0 - cover)) as u8
}

/// Alpha-blend a sprite onto the canvas with its top-left corner at
/// (x, y). Sprite pixels past the canvas edge are dropped; destination
/// alpha keeps the more opaque of the two layers.
fn overlay_alpha(canvas: &mut RgbaImage, sprite: &RgbaImage, x: u32, y: u32) {
    let (cw, ch) = canvas.dimensions();
    for (sx, sy, src) in sprite.enumerate_pixels() {
        let Rgba([r, g, b, alpha]) = *src;
        if alpha == 0 {
            continue;
        }
        let cx = x + sx;
        let cy = y + sy;
        if cx >= cw || cy >= ch {
            continue;
        }
        let cover = alpha as f32 / 255.0;
        let dst = canvas.get_pixel_mut(cx, cy);
        *dst = Rgba([
            mix(r, dst.0[0], cover),
            mix(g, dst.0[1], cover),
            mix(b, dst.0[2], cover),
            alpha.max(dst.0[3]),
        ]);
    }
}

/// Rendered width of a text run, for right alignment.
fn text_width(font: &Font<'_>, px: f32, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let mut width: f32 = 0.0;
    for g in font.layout(text, scale, point(0.0, v_metrics.ascent)) {
        if let Some(bb) = g.pixel_bounding_box() {
            width = width.max(bb.max.x as f32);
        }
    }
    width
}

/// Blend a text run onto the canvas; `y` is the baseline.
fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'_>,
    px: f32,
    x: f32,
    baseline_y: f32,
    color: Rgba<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let mut caret_x = x;

    for ch in text.chars() {
        let glyph = font
            .glyph(ch)
            .scaled(scale)
            .positioned(point(caret_x, baseline_y));
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, cover| {
                let cx = gx as i32 + bb.min.x;
                let cy = gy as i32 + bb.min.y;
                if cx < 0 || cy < 0 {
                    return;
                }
                let (cx, cy) = (cx as u32, cy as u32);
                if cx >= img.width() || cy >= img.height() || cover <= 0.0 {
                    return;
                }
                let dst = img.get_pixel_mut(cx, cy);
                *dst = Rgba([
                    mix(color.0[0], dst.0[0], cover),
                    mix(color.0[1], dst.0[1], cover),
                    mix(color.0[2], dst.0[2], cover),
                    255,
                ]);
            });
        }
        caret_x += glyph.unpositioned().h_metrics().advance_width;
    }
}

/// Encode the finished canvas as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, DrawError> {
    let mut buf = Vec::new();
    let enc = image::codecs::png::PngEncoder::new(&mut buf);
    enc.write_image(img, img.width(), img.height(), image::ExtendedColorType::Rgba8)
        .map_err(|e| DrawError::Image(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(images: &[(&str, RgbaImage)]) -> (TempDir, AssetStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, img) in images {
            img.save(dir.path().join(format!("{name}.png"))).unwrap();
        }
        let store = AssetStore::new(dir.path());
        (dir, store)
    }

    /// Vertical strip of 32x32 rows, row `i` filled with channel value `i`.
    fn rank_sheet(rows: u8) -> RgbaImage {
        RgbaImage::from_fn(32, rows as u32 * 32, |_, y| {
            let row = (y / 32) as u8;
            Rgba([row, row, row, 255])
        })
    }

    #[test]
    fn sprite_overlays_at_position() {
        let (_dir, store) = store_with(&[(
            "icon",
            RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])),
        )]);
        let mut canvas = RgbaImage::from_pixel(64, 32, Rgba([255, 0, 0, 255]));

        let op = DrawOp::Sprite {
            asset: "icon".into(),
            crop: None,
            fit: None,
            at: (10, 5),
        };
        apply(&store, &mut canvas, &op).unwrap();

        assert_eq!(canvas.get_pixel(10, 5), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(17, 12), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(18, 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn crop_selects_the_requested_tile() {
        let (_dir, store) = store_with(&[("ranks", rank_sheet(5))]);
        let mut canvas = RgbaImage::from_pixel(128, 64, Rgba([200, 200, 200, 255]));

        // second row of the sheet
        let op = DrawOp::Sprite {
            asset: "ranks".into(),
            crop: Some((0, 32, 32, 32)),
            fit: None,
            at: (64, 18),
        };
        apply(&store, &mut canvas, &op).unwrap();

        assert_eq!(canvas.get_pixel(64, 18), &Rgba([1, 1, 1, 255]));
        assert_eq!(canvas.get_pixel(95, 45), &Rgba([1, 1, 1, 255]));
        assert_eq!(canvas.get_pixel(63, 18), &Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn crop_outside_the_sheet_fails() {
        let (_dir, store) = store_with(&[("ranks", rank_sheet(5))]);
        let mut canvas = RgbaImage::from_pixel(128, 64, Rgba([0, 0, 0, 255]));

        let op = DrawOp::Sprite {
            asset: "ranks".into(),
            crop: Some((0, 5 * 32, 32, 32)),
            fit: None,
            at: (64, 18),
        };
        match apply(&store, &mut canvas, &op) {
            Err(DrawError::Crop { asset, y, .. }) => {
                assert_eq!(asset, "ranks");
                assert_eq!(y, 160);
            }
            other => panic!("expected Crop error, got {other:?}"),
        }
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let (_dir, store) = store_with(&[(
            "stripe_alpha",
            RgbaImage::from_pixel(512, 128, Rgba([0, 255, 0, 255])),
        )]);
        let mut canvas = RgbaImage::from_pixel(350, 64, Rgba([0, 0, 0, 255]));

        // 512x128 fit into 256x64 -> exactly 256x64
        let op = DrawOp::Sprite {
            asset: "stripe_alpha".into(),
            crop: None,
            fit: Some((256, 64)),
            at: (29, 1),
        };
        apply(&store, &mut canvas, &op).unwrap();

        // resampling may shift channel values by a hair; check coverage,
        // not exact color
        let black = Rgba([0, 0, 0, 255]);
        assert_ne!(canvas.get_pixel(29, 1), &black);
        assert_ne!(canvas.get_pixel(29 + 255, 1 + 63), &black);
        // one past the fitted box is untouched
        assert_eq!(canvas.get_pixel(29 + 256, 1), &black);
    }

    #[test]
    fn overlay_clips_at_canvas_edge() {
        let (_dir, store) = store_with(&[(
            "icon",
            RgbaImage::from_pixel(16, 16, Rgba([0, 0, 255, 255])),
        )]);
        let mut canvas = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 255]));

        let op = DrawOp::Sprite {
            asset: "icon".into(),
            crop: None,
            fit: None,
            at: (12, 12),
        };
        apply(&store, &mut canvas, &op).unwrap();
        assert_eq!(canvas.get_pixel(19, 19), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn encode_png_round_trips() {
        let canvas = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let png = encode_png(&canvas).unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back, canvas);
    }
}
