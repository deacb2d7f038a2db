//! 傷記録の型定義
//!
//! CLI・デスクトップ・Web(WASM)で共有される型:
//! - DamageRecord: 図上の1点に付けた傷記録
//! - Ledger: 号車 → 傷記録の列（クリック順）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 写真未選択時に使う画像URL
pub const PLACEHOLDER_PHOTO_URL: &str = "https://via.placeholder.com/150";

/// メモ未入力時のメモ
pub const DEFAULT_NOTE: &str = "テストメモ";

/// 記録者の既定値
pub const DEFAULT_UPLOADER: &str = "テストユーザー";

/// 記録日時のフォーマット（chrono / strftime 形式）
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// 傷記録
///
/// `x`/`y` は図の表示サイズに対する割合（0〜100）。
/// 作成後に変更されることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRecord {
    pub x: f64,
    pub y: f64,

    #[serde(default)]
    pub note: String,

    /// 写真のData URI、または PLACEHOLDER_PHOTO_URL
    #[serde(default = "placeholder_photo_url")]
    pub photo_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
}

fn placeholder_photo_url() -> String {
    PLACEHOLDER_PHOTO_URL.to_string()
}

impl DamageRecord {
    /// 写真が添付されているか（プレースホルダーでない）
    pub fn has_photo(&self) -> bool {
        self.photo_url.starts_with("data:")
    }

    /// マーカーのツールチップ: "日時 記録者"
    pub fn tooltip(&self) -> String {
        format!(
            "{} {}",
            self.timestamp.as_deref().unwrap_or_default(),
            self.uploader.as_deref().unwrap_or_default()
        )
    }
}

/// 号車ごとの傷記録台帳
///
/// 追記のみ。保存形式は号車キー → 記録配列のJSONオブジェクト（バージョンなし）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<String, Vec<DamageRecord>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 号車の記録（クリック順）。記録がなければ空
    pub fn records(&self, car_id: &str) -> &[DamageRecord] {
        self.entries.get(car_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 記録を末尾に追加し、そのインデックスを返す
    pub fn append(&mut self, car_id: &str, record: DamageRecord) -> usize {
        let records = self.entries.entry(car_id.to_string()).or_default();
        records.push(record);
        records.len() - 1
    }

    /// 保存失敗時の巻き戻し用
    pub(crate) fn pop_last(&mut self, car_id: &str) -> Option<DamageRecord> {
        let records = self.entries.get_mut(car_id)?;
        let popped = records.pop();
        if records.is_empty() {
            self.entries.remove(car_id);
        }
        popped
    }

    /// 記録のある号車キー
    pub fn car_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 全号車の記録数
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
