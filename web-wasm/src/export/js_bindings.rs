//! JavaScript Bridge バインディング
//!
//! 表示中の要素の画像化（html2canvas）とPDF化（jsPDF）をJavaScript側に委譲する。

use car_damage_common::export::{PDF_MARGIN_MM, PDF_IMAGE_WIDTH_MM};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// PDF上の画像配置（高さは縦横比から決まる）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsPdfPlacement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
}

impl Default for JsPdfPlacement {
    fn default() -> Self {
        Self {
            x_mm: PDF_MARGIN_MM,
            y_mm: PDF_MARGIN_MM,
            width_mm: PDF_IMAGE_WIDTH_MM,
        }
    }
}

#[wasm_bindgen(module = "/js/export-bridge.js")]
extern "C" {
    /// 要素をPNGとして保存
    #[wasm_bindgen(js_name = "exportElementAsPng", catch)]
    pub async fn export_png_js(element_id: &str, file_name: &str) -> Result<(), JsValue>;

    /// 要素をA4 PDFとして保存
    ///
    /// # Arguments
    /// * `element_id` - 画像化する要素のID
    /// * `file_name` - 保存ファイル名
    /// * `placement_json` - JsPdfPlacementのJSON文字列
    #[wasm_bindgen(js_name = "exportElementAsPdf", catch)]
    pub async fn export_pdf_js(
        element_id: &str,
        file_name: &str,
        placement_json: &str,
    ) -> Result<(), JsValue>;
}

pub fn placement_to_json(placement: &JsPdfPlacement) -> Result<String, String> {
    serde_json::to_string(placement).map_err(|e| format!("JSON serialization failed: {}", e))
}
