use crate::dispatch::DispatchSettings;
use crate::error::{DamageCheckError, Result};
use car_damage_common::{LoadPolicy, Variant, DEFAULT_SHEET_URL, DEFAULT_UPLOADER, STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const WEBHOOK_ENV: &str = "CAR_DAMAGE_SLACK_WEBHOOK";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 記録者名
    pub uploader: String,
    pub variant: Variant,
    /// 台帳ファイル（省略時はデータディレクトリ）
    pub ledger_path: Option<PathBuf>,
    /// 送信待ちキューファイル（省略時はデータディレクトリ）
    pub outbox_path: Option<PathBuf>,
    pub sheet_url: String,
    pub slack_webhook: Option<String>,
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub load_policy: LoadPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            uploader: DEFAULT_UPLOADER.into(),
            variant: Variant::Standard,
            ledger_path: None,
            outbox_path: None,
            sheet_url: DEFAULT_SHEET_URL.into(),
            slack_webhook: None,
            timeout_seconds: 10,
            max_attempts: 3,
            retry_backoff_ms: 500,
            load_policy: LoadPolicy::FallbackEmpty,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DamageCheckError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("car-damage-check").join("config.json"))
    }

    fn data_dir() -> Result<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| DamageCheckError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("car-damage-check"))
    }

    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.ledger_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join(format!("{}.json", STORAGE_KEY))),
        }
    }

    /// 台帳と同じ場所に置く
    pub fn outbox_path(&self) -> Result<PathBuf> {
        match &self.outbox_path {
            Some(path) => Ok(path.clone()),
            None => {
                let ledger = self.ledger_path()?;
                Ok(ledger.with_file_name("outbox.json"))
            }
        }
    }

    /// 環境変数を優先
    pub fn slack_webhook(&self) -> Option<String> {
        std::env::var(WEBHOOK_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.slack_webhook.clone())
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            sheet_url: self.sheet_url.clone(),
            slack_webhook: self.slack_webhook(),
            timeout: Duration::from_secs(self.timeout_seconds.max(1)),
            max_attempts: self.max_attempts.max(1),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn set_uploader(&mut self, uploader: String) -> Result<()> {
        self.uploader = uploader;
        self.save()
    }

    pub fn set_webhook(&mut self, webhook: String) -> Result<()> {
        self.slack_webhook = if webhook.trim().is_empty() { None } else { Some(webhook) };
        self.save()
    }

    pub fn set_variant(&mut self, variant: Variant) -> Result<()> {
        self.variant = variant;
        self.save()
    }
}
