//! 図面エクスポート（ブラウザ版）
//!
//! 表示中の図をJavaScript側で画像化して保存する。

pub mod js_bindings;

use car_damage_common::export::DIAGRAM_ELEMENT_ID;
use car_damage_common::{export_file_name, ExportFormat};
use js_bindings::{export_png_js, export_pdf_js, placement_to_json, JsPdfPlacement};

/// 選択中の号車の図を保存する
pub async fn export_diagram(car_id: &str, format: ExportFormat) -> Result<(), String> {
    let file_name = export_file_name(car_id, format);
    match format {
        ExportFormat::Png => export_png_js(DIAGRAM_ELEMENT_ID, &file_name)
            .await
            .map_err(|e| format!("PNG export failed: {:?}", e)),
        ExportFormat::Pdf => {
            let placement = placement_to_json(&JsPdfPlacement::default())?;
            export_pdf_js(DIAGRAM_ELEMENT_ID, &file_name, &placement)
                .await
                .map_err(|e| format!("PDF export failed: {:?}", e))
        }
    }
}
