//! 外部通知キュー
//!
//! 配置ハンドラは通知・スプレッドシート送信をここに積むだけで、
//! 実際の送信は別のディスパッチャが非同期に行う。

use crate::error::Result;
use crate::types::DamageRecord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// 既定のスプレッドシート送信先（Apps Script）
pub const DEFAULT_SHEET_URL: &str = "https://script.google.com/macros/s/AKfycbw8aNkm_KKTVBRj92MRawb6OJM_6xAfI69Y8VyFmchlMOmBLC3BZD5OFOq7TJSAw5gGjg/exec";

/// スプレッドシートへ送る1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPayload {
    pub car_id: String,
    pub x: f64,
    pub y: f64,
    pub note: String,
    pub photo_url: String,
    pub timestamp: Option<String>,
    pub uploader: Option<String>,
}

impl SheetPayload {
    pub fn new(car_id: &str, record: &DamageRecord) -> Self {
        Self {
            car_id: car_id.to_string(),
            x: record.x,
            y: record.y,
            note: record.note.clone(),
            photo_url: record.photo_url.clone(),
            timestamp: record.timestamp.clone(),
            uploader: record.uploader.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundEvent {
    /// チャット通知
    Notify {
        #[serde(rename = "carId")]
        car_id: String,
        message: String,
    },
    /// スプレッドシートへのPOST
    SheetRow(SheetPayload),
}

impl OutboundEvent {
    pub fn car_id(&self) -> &str {
        match self {
            OutboundEvent::Notify { car_id, .. } => car_id,
            OutboundEvent::SheetRow(payload) => &payload.car_id,
        }
    }
}

/// 通知本文
pub fn notify_message(car_id: &str, record: &DamageRecord) -> String {
    format!(
        "📢 {}に傷記録が追加されました\n\n記録者: {}\n日時: {}\nメモ: {}",
        car_id,
        record.uploader.as_deref().unwrap_or_default(),
        record.timestamp.as_deref().unwrap_or_default(),
        record.note
    )
}

/// 新しい記録1件に対して積むイベント
pub fn events_for(car_id: &str, record: &DamageRecord) -> [OutboundEvent; 2] {
    [
        OutboundEvent::Notify {
            car_id: car_id.to_string(),
            message: notify_message(car_id, record),
        },
        OutboundEvent::SheetRow(SheetPayload::new(car_id, record)),
    ]
}

/// FIFOの送信待ちキュー
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outbox {
    queue: VecDeque<OutboundEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: OutboundEvent) {
        self.queue.push_back(event);
    }

    /// 積んだ順に全件取り出す
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// キューファイルを読み込み（なければ空）
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl Extend<OutboundEvent> for Outbox {
    fn extend<I: IntoIterator<Item = OutboundEvent>>(&mut self, iter: I) {
        self.queue.extend(iter);
    }
}
