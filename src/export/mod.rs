pub mod pdf;
pub mod raster;

use crate::error::Result;
use car_damage_common::{export_file_name, DamageRecord, ExportFormat, MarkerStyle};
use std::path::{Path, PathBuf};

fn output_path_for(output: &Path, car_id: &str, format: ExportFormat) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(export_file_name(car_id, format))
    } else {
        output.to_path_buf()
    }
}

/// 図を画像化して PNG / PDF のバイト列にする
pub fn render(
    diagram_path: &Path,
    records: &[DamageRecord],
    style: MarkerStyle,
    car_id: &str,
    format: ExportFormat,
) -> Result<Vec<u8>> {
    let diagram = raster::load_diagram(diagram_path)?;
    let canvas = raster::rasterize(&diagram, records, style);
    match format {
        ExportFormat::Png => raster::encode_png(&canvas),
        ExportFormat::Pdf => pdf::render_pdf(&canvas, &format!("{} 傷記録", car_id)),
    }
}

/// 図を出力してファイルパスを返す
pub fn export_diagram(
    diagram_path: &Path,
    records: &[DamageRecord],
    style: MarkerStyle,
    car_id: &str,
    format: ExportFormat,
    output: &Path,
) -> Result<PathBuf> {
    let bytes = render(diagram_path, records, style, car_id, format)?;
    let output_path = output_path_for(output, car_id, format);
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output_path, bytes)?;
    tracing::info!(path = %output_path.display(), records = records.len(), "図を出力しました");
    Ok(output_path)
}
