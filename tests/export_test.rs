//! PNG/PDF出力の統合テスト

use car_damage_check::export;
use car_damage_common::{DamageRecord, ExportFormat, MarkerStyle, PLACEHOLDER_PHOTO_URL};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn create_diagram(dir: &Path) -> PathBuf {
    let path = dir.join("car-top-view.png");
    RgbaImage::from_pixel(512, 256, Rgba([240, 240, 240, 255]))
        .save(&path)
        .expect("図の作成に失敗");
    path
}

fn create_test_record(index: usize) -> DamageRecord {
    DamageRecord {
        x: 10.0 * index as f64,
        y: 50.0,
        note: format!("傷{}", index),
        photo_url: PLACEHOLDER_PHOTO_URL.to_string(),
        timestamp: Some("2026/01/18 10:00:00".to_string()),
        uploader: Some("テストユーザー".to_string()),
    }
}

#[test]
fn test_png_export_to_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let diagram = create_diagram(dir.path());
    let records: Vec<DamageRecord> = (1..=3).map(create_test_record).collect();

    let path = export::export_diagram(
        &diagram,
        &records,
        MarkerStyle::Badge,
        "1号車",
        ExportFormat::Png,
        dir.path(),
    )
    .expect("PNG出力に失敗");

    assert_eq!(path, dir.path().join("1号車_damage.png"));
    let exported = image::open(&path).expect("PNGが読めない").to_rgba8();
    assert_eq!(exported.dimensions(), (512, 256));
    // 1件目のマーカー (10%, 50%) の「!」の左側は赤
    assert_eq!(&exported.get_pixel(46, 128).0[..3], &[220, 38, 38]);
}

#[test]
fn test_pdf_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let diagram = create_diagram(dir.path());
    let records: Vec<DamageRecord> = (1..=2).map(create_test_record).collect();

    let path = export::export_diagram(
        &diagram,
        &records,
        MarkerStyle::Badge,
        "2号車",
        ExportFormat::Pdf,
        dir.path(),
    )
    .expect("PDF出力に失敗");

    assert_eq!(path.file_name().unwrap(), "2号車_damage.pdf");
    let bytes = std::fs::read(&path).expect("PDFが読めない");
    assert!(bytes.starts_with(b"%PDF"), "PDFヘッダーがない");
}

#[test]
fn test_pdf_export_without_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    let diagram = create_diagram(dir.path());

    let result = export::render(&diagram, &[], MarkerStyle::Dot, "3号車", ExportFormat::Pdf);
    assert!(result.is_ok(), "記録なしのPDF生成に失敗: {:?}", result.err());
}

#[test]
fn test_explicit_output_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let diagram = create_diagram(dir.path());
    let output = dir.path().join("out").join("report.png");

    let path = export::export_diagram(
        &diagram,
        &[create_test_record(5)],
        MarkerStyle::Dot,
        "5号車",
        ExportFormat::Png,
        &output,
    )
    .expect("PNG出力に失敗");
    assert_eq!(path, output);
    assert!(output.exists());
}

#[test]
fn test_missing_diagram() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = export::render(
        &dir.path().join("nope.png"),
        &[],
        MarkerStyle::Badge,
        "1号車",
        ExportFormat::Png,
    );
    assert!(matches!(
        result,
        Err(car_damage_check::error::DamageCheckError::FileNotFound(_))
    ));
}

#[test]
fn test_unreadable_diagram_is_export_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not an image").unwrap();

    let err = export::render(&path, &[], MarkerStyle::Badge, "1号車", ExportFormat::Png).unwrap_err();
    assert!(format!("{}", err).contains("Export error"));
}
