//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// 永続化ポートのエラー
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage error: 保存データが不正です ({0})")]
    Malformed(String),

    #[error("Storage error: 読み込みに失敗しました ({0})")]
    Read(String),

    #[error("Storage error: 保存に失敗しました ({0})")]
    Write(String),

    #[error("Storage error: ストレージが利用できません")]
    Unavailable,
}

/// 入力検証エラー（ユーザーに表示するメッセージを持つ）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("写真を選択してください")]
    PhotoRequired,

    #[error("図の表示サイズが不正です: {width}x{height}")]
    EmptyBoundingBox { width: f64, height: f64 },

    #[error("クリック位置が不正です: ({x}, {y})")]
    NonFinitePointer { x: f64, y: f64 },

    #[error("不明な号車です: {0}")]
    UnknownVehicle(String),

    #[error("記録が見つかりません: {car} #{index}")]
    RecordNotFound { car: String, index: usize },

    #[error("Data URIが不正です: {0}")]
    InvalidDataUri(String),

    #[error("号車リストが空です")]
    EmptyCatalog,
}

/// エクスポートのエラー
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export error: 図の読み込みに失敗しました ({0})")]
    Diagram(String),

    #[error("Export error: 画像化に失敗しました ({0})")]
    Rasterize(String),

    #[error("Export error: PDF生成に失敗しました ({0})")]
    Pdf(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
