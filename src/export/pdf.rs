use crate::error::Result;
use car_damage_common::ExportError;
use car_damage_common::export::{PdfPlacement, A4_HEIGHT_MM, A4_WIDTH_MM};
use ::image::RgbaImage;
use printpdf::*;

/// 画像化した図を A4 1ページのPDFに埋め込む
pub fn render_pdf(raster: &RgbaImage, title: &str) -> Result<Vec<u8>> {
    let (width, height) = raster.dimensions();
    let placement = PdfPlacement::for_image(width, height)
        .ok_or_else(|| ExportError::Pdf("画像サイズが0です".into()))?;

    let mut doc = PdfDocument::new(title);

    let image = RawImage {
        pixels: RawImageData::U8(flatten_on_white(raster)),
        width: width as usize,
        height: height as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };
    let image_id = doc.add_image(&image);

    let ops = vec![Op::UseXobject {
        id: image_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(placement.translate_x_pt)),
            translate_y: Some(Pt(placement.translate_y_pt)),
            scale_x: Some(placement.scale),
            scale_y: Some(placement.scale),
            // 72dpi: 1px = 1pt
            dpi: Some(72.0),
            ..Default::default()
        },
    }];

    let page = PdfPage::new(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), ops);
    let mut warnings = Vec::new();
    let bytes = doc
        .with_pages(vec![page])
        .save(&PdfSaveOptions::default(), &mut warnings);

    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "PDF生成時の警告");
    }
    if bytes.is_empty() {
        return Err(ExportError::Pdf("PDFが空です".into()).into());
    }
    Ok(bytes)
}

/// RGBA → 白背景に合成した RGB
fn flatten_on_white(raster: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(raster.width() as usize * raster.height() as usize * 3);
    for pixel in raster.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            rgb.push(((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8);
        }
    }
    rgb
}
