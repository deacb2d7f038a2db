//! 出力レイアウト計算
//!
//! PDFは A4 縦1ページ、左上から 10mm の位置に幅 190mm で図を置く。

use crate::catalog::MarkerStyle;
use crate::marker::REFERENCE_WIDTH_PX;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;
pub const PDF_MARGIN_MM: f32 = 10.0;
pub const PDF_IMAGE_WIDTH_MM: f32 = 190.0;

/// mm → pt
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// PDF上の画像配置（pt単位、原点は左下）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfPlacement {
    pub translate_x_pt: f32,
    pub translate_y_pt: f32,
    pub width_pt: f32,
    pub height_pt: f32,
    /// 72dpi で配置したときの拡大率（1px = 1pt）
    pub scale: f32,
}

impl PdfPlacement {
    /// 画像サイズ(px)から配置を計算。高さは縦横比を保つ
    pub fn for_image(width_px: u32, height_px: u32) -> Option<Self> {
        if width_px == 0 || height_px == 0 {
            return None;
        }
        let width_pt = mm_to_pt(PDF_IMAGE_WIDTH_MM);
        let scale = width_pt / width_px as f32;
        let height_pt = height_px as f32 * scale;
        let translate_x_pt = mm_to_pt(PDF_MARGIN_MM);
        let translate_y_pt = mm_to_pt(A4_HEIGHT_MM) - mm_to_pt(PDF_MARGIN_MM) - height_pt;
        Some(Self {
            translate_x_pt,
            translate_y_pt,
            width_pt,
            height_pt,
            scale,
        })
    }
}

/// 画像幅に合わせたマーカー直径(px)
pub fn marker_diameter_for_width(style: MarkerStyle, image_width_px: u32) -> f64 {
    style.diameter_px() * image_width_px as f64 / REFERENCE_WIDTH_PX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_pt() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_placement_keeps_aspect() {
        let placement = PdfPlacement::for_image(1000, 500).unwrap();
        assert!((placement.height_pt * 2.0 - placement.width_pt).abs() < 1e-3);
        assert!((placement.translate_x_pt - mm_to_pt(10.0)).abs() < 1e-4);
        let top = placement.translate_y_pt + placement.height_pt;
        assert!((top - mm_to_pt(287.0)).abs() < 1e-2);
    }

    #[test]
    fn test_placement_empty_image() {
        assert!(PdfPlacement::for_image(0, 10).is_none());
    }

    #[test]
    fn test_marker_diameter_scales() {
        assert_eq!(marker_diameter_for_width(MarkerStyle::Badge, 512), 24.0);
        assert_eq!(marker_diameter_for_width(MarkerStyle::Badge, 1024), 48.0);
    }
}
