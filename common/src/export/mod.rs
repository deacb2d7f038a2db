//! Export core shared across CLI, desktop and WASM wrappers.

pub mod layout;

pub use layout::{PdfPlacement, A4_HEIGHT_MM, A4_WIDTH_MM, PDF_IMAGE_WIDTH_MM, PDF_MARGIN_MM};

use serde::{Deserialize, Serialize};

/// Web版で画像化する要素のID
pub const DIAGRAM_ELEMENT_ID: &str = "car-area";

/// 出力形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    #[default]
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(format!("Unknown format: {}. Use png or pdf", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// ダウンロードファイル名: `{号車}_damage.{拡張子}`
pub fn export_file_name(car_id: &str, format: ExportFormat) -> String {
    format!("{}_damage.{}", car_id, format.extension())
}
