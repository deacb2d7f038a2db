//! 図面の画像化
//!
//! 車両図の上に選択中の号車のマーカーを描き込んだ RGBA 画像を作る。

use crate::error::{DamageCheckError, Result};
use car_damage_common::ExportError;
use car_damage_common::export::layout::marker_diameter_for_width;
use car_damage_common::{DamageRecord, MarkerStyle};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

const WHITE: [u8; 3] = [255, 255, 255];

pub fn load_diagram(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(DamageCheckError::FileNotFound(path.display().to_string()));
    }
    let diagram = image::open(path)
        .map_err(|e| ExportError::Diagram(format!("{}: {}", path.display(), e)))?;
    Ok(diagram)
}

/// 図にマーカーを描き込む
pub fn rasterize(diagram: &DynamicImage, records: &[DamageRecord], style: MarkerStyle) -> RgbaImage {
    let mut canvas = diagram.to_rgba8();
    let (width, height) = canvas.dimensions();
    let diameter = marker_diameter_for_width(style, width);

    for record in records {
        let cx = width as f64 * record.x / 100.0;
        let cy = height as f64 * record.y / 100.0;
        fill_circle(&mut canvas, cx, cy, diameter / 2.0, style.color());
        if style == MarkerStyle::Badge {
            draw_exclamation(&mut canvas, cx, cy, diameter);
        }
    }
    canvas
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::Rasterize(format!("PNGエンコード失敗: {}", e)))?;
    Ok(bytes)
}

fn fill_circle(canvas: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: [u8; 3]) {
    let (width, height) = canvas.dimensions();
    let x0 = (cx - radius - 1.0).floor().max(0.0) as u32;
    let y0 = (cy - radius - 1.0).floor().max(0.0) as u32;
    let x1 = ((cx + radius + 1.0).ceil().max(0.0) as u32).min(width);
    let y1 = ((cy + radius + 1.0).ceil().max(0.0) as u32).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend(canvas.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, left: f64, top: f64, right: f64, bottom: f64, color: [u8; 3]) {
    let (width, height) = canvas.dimensions();
    let x0 = left.round().max(0.0) as u32;
    let y0 = top.round().max(0.0) as u32;
    let x1 = (right.round().max(0.0) as u32).min(width);
    let y1 = (bottom.round().max(0.0) as u32).min(height);
    for y in y0..y1 {
        for x in x0..x1 {
            blend(canvas.get_pixel_mut(x, y), color, 1.0);
        }
    }
}

/// 「!」: 縦棒 + 点
fn draw_exclamation(canvas: &mut RgbaImage, cx: f64, cy: f64, diameter: f64) {
    let half_bar = (diameter * 0.06).max(0.5);
    fill_rect(
        canvas,
        cx - half_bar,
        cy - diameter * 0.28,
        cx + half_bar,
        cy + diameter * 0.08,
        WHITE,
    );
    fill_circle(canvas, cx, cy + diameter * 0.2, (diameter * 0.07).max(0.5), WHITE);
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], alpha: f64) {
    for (channel, target) in pixel.0.iter_mut().take(3).zip(color) {
        *channel = (*channel as f64 * (1.0 - alpha) + target as f64 * alpha).round() as u8;
    }
    pixel.0[3] = pixel.0[3].max((alpha * 255.0).round() as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use car_damage_common::PLACEHOLDER_PHOTO_URL;

    fn record(x: f64, y: f64) -> DamageRecord {
        DamageRecord {
            x,
            y,
            note: String::new(),
            photo_url: PLACEHOLDER_PHOTO_URL.to_string(),
            timestamp: None,
            uploader: None,
        }
    }

    fn white_diagram(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn test_rasterize_keeps_size() {
        let raster = rasterize(&white_diagram(512, 256), &[record(50.0, 50.0)], MarkerStyle::Badge);
        assert_eq!(raster.dimensions(), (512, 256));
    }

    #[test]
    fn test_marker_is_red_near_center() {
        let raster = rasterize(&white_diagram(512, 512), &[record(25.0, 25.0)], MarkerStyle::Dot);
        let pixel = raster.get_pixel(128, 128);
        assert_eq!(&pixel.0[..3], &[220, 38, 38]);
        let far = raster.get_pixel(400, 400);
        assert_eq!(&far.0[..3], &[255, 255, 255]);
    }

    #[test]
    fn test_badge_has_white_mark() {
        let raster = rasterize(&white_diagram(512, 512), &[record(50.0, 50.0)], MarkerStyle::Badge);
        // 縦棒の中心
        let bar = raster.get_pixel(256, 252);
        assert_eq!(&bar.0[..3], &[255, 255, 255]);
        // 棒の横は赤
        let side = raster.get_pixel(249, 252);
        assert_eq!(&side.0[..3], &[220, 38, 38]);
    }

    #[test]
    fn test_marker_on_edge_is_clipped() {
        let raster = rasterize(&white_diagram(100, 100), &[record(100.0, 0.0), record(-5.0, 120.0)], MarkerStyle::Badge);
        assert_eq!(raster.dimensions(), (100, 100));
    }

    #[test]
    fn test_encode_png_signature() {
        let raster = rasterize(&white_diagram(16, 16), &[], MarkerStyle::Badge);
        let bytes = encode_png(&raster).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
