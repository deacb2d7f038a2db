//! 送信待ちイベントのディスパッチャ
//!
//! キューから取り出したイベントを並行に送信する。送信順は保証しない。
//! 失敗は再試行の後ログに残し、呼び出し側へ返して送信待ちに戻させる。
//! 台帳には影響しない。

mod transport;

pub use transport::{HttpTransport, Transport};

use crate::error::Result;
use car_damage_common::{OutboundEvent, Outbox};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub sheet_url: String,
    /// 未設定なら通知はログ出力のみ
    pub slack_webhook: Option<String>,
    /// 1回の送信のタイムアウト
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

/// 1イベントの送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    LoggedOnly,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub logged_only: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::LoggedOnly => self.logged_only += 1,
            Delivery::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.delivered + self.logged_only + self.failed
    }
}

pub struct Dispatcher<T> {
    transport: T,
    settings: DispatchSettings,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, settings: DispatchSettings) -> Self {
        Self { transport, settings }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// 全イベントを並行に送信
    pub async fn dispatch_all(&self, events: Vec<OutboundEvent>) -> DispatchReport {
        self.dispatch_pending(events).await.0
    }

    /// 全イベントを並行に送信し、失敗したイベントを返す
    pub async fn dispatch_pending(
        &self,
        events: Vec<OutboundEvent>,
    ) -> (DispatchReport, Vec<OutboundEvent>) {
        let deliveries =
            futures::future::join_all(events.iter().map(|event| self.dispatch_one(event))).await;

        let mut report = DispatchReport::default();
        let mut failed = Vec::new();
        for (event, delivery) in events.into_iter().zip(deliveries) {
            report.record(delivery);
            if delivery == Delivery::Failed {
                failed.push(event);
            }
        }
        tracing::debug!(?report, "送信完了");
        (report, failed)
    }

    /// 送信待ちファイルに `events` を積んでから全件送信する
    ///
    /// 送信前にファイルは空で保存し、失敗したイベントだけを書き戻す。
    /// 同じファイルを扱う呼び出しは直列化すること。
    pub async fn flush_outbox(&self, path: &Path, events: Vec<OutboundEvent>) -> Result<DispatchReport> {
        let mut outbox = Outbox::load_file(path)?;
        outbox.extend(events);
        let pending = outbox.drain();
        outbox.save_file(path)?;

        let (report, failed) = self.dispatch_pending(pending).await;
        if !failed.is_empty() {
            let mut outbox = Outbox::load_file(path)?;
            tracing::warn!(count = failed.len(), "送信失敗分を送信待ちに戻します");
            outbox.extend(failed);
            outbox.save_file(path)?;
        }
        Ok(report)
    }

    pub async fn dispatch_one(&self, event: &OutboundEvent) -> Delivery {
        match event {
            OutboundEvent::Notify { car_id, message } => match &self.settings.slack_webhook {
                None => {
                    tracing::info!(car = %car_id, "Slack通知: {}", message);
                    Delivery::LoggedOnly
                }
                Some(webhook) => {
                    let body = serde_json::json!({ "text": message });
                    self.send_with_retry("Slack通知", webhook, &body).await
                }
            },
            OutboundEvent::SheetRow(payload) => match serde_json::to_value(payload) {
                Ok(body) => {
                    let url = self.settings.sheet_url.clone();
                    self.send_with_retry("スプレッドシート送信", &url, &body).await
                }
                Err(e) => {
                    tracing::error!(car = %payload.car_id, error = %e, "❌ スプレッドシート送信エラー");
                    Delivery::Failed
                }
            },
        }
    }

    async fn send_with_retry(&self, label: &str, url: &str, body: &serde_json::Value) -> Delivery {
        let attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.settings.timeout, self.transport.post_json(url, body)).await {
                Ok(Ok(status)) if (200..300).contains(&status) => {
                    tracing::info!(attempt, status, "📋 {}成功", label);
                    return Delivery::Delivered;
                }
                Ok(Ok(status)) => {
                    tracing::warn!(attempt, status, "{}: 異常なステータス", label);
                }
                Ok(Err(e)) => {
                    tracing::warn!(attempt, error = %e, "{}: 送信失敗", label);
                }
                Err(_) => {
                    tracing::warn!(attempt, timeout = ?self.settings.timeout, "{}: タイムアウト", label);
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.backoff).await;
            }
        }
        tracing::error!(attempts, "❌ {}エラー（再試行上限）", label);
        Delivery::Failed
    }
}
