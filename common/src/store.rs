//! 台帳の永続化ポート
//!
//! 画面側はこのトレイト越しにのみ台帳を読み書きする。
//! - MemoryStore: テスト用（localStorage 相当の文字列を保持）
//! - JsonFileStore: ネイティブ用（JSONファイル1つ）

use crate::error::{Result, StorageError};
use crate::types::Ledger;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 保存キー（localStorage のキー、ファイル名の元）
pub const STORAGE_KEY: &str = "damageRecords";

/// 保存データが壊れていたときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// 警告を出して空の台帳で起動する
    #[default]
    FallbackEmpty,
    /// StorageError::Malformed を返す
    FailFast,
}

pub trait LedgerStore {
    /// 保存されていなければ空の台帳
    fn load(&self) -> Result<Ledger>;

    fn save(&mut self, ledger: &Ledger) -> Result<()>;
}

/// 保存文字列を台帳に変換
///
/// `None`（未保存）は空の台帳。壊れたJSONは policy に従う。
pub fn decode_ledger(raw: Option<&str>, policy: LoadPolicy) -> Result<Ledger> {
    let Some(raw) = raw else {
        return Ok(Ledger::new());
    };
    if raw.trim().is_empty() {
        return Ok(Ledger::new());
    }
    match Ledger::from_json(raw) {
        Ok(ledger) => Ok(ledger),
        Err(e) => match policy {
            LoadPolicy::FallbackEmpty => {
                tracing::warn!(error = %e, "保存データが不正なため空の台帳で起動します");
                Ok(Ledger::new())
            }
            LoadPolicy::FailFast => Err(StorageError::Malformed(e.to_string()).into()),
        },
    }
}

/// メモリ上のストア
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
    policy: LoadPolicy,
    fail_saves: bool,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済み文字列を持った状態で作る（壊れたデータの再現用）
    pub fn with_raw(raw: impl Into<String>, policy: LoadPolicy) -> Self {
        Self {
            raw: Some(raw.into()),
            policy,
            ..Self::default()
        }
    }

    /// true の間、save が StorageError::Write を返す
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Ledger> {
        decode_ledger(self.raw.as_deref(), self.policy)
    }

    fn save(&mut self, ledger: &Ledger) -> Result<()> {
        if self.fail_saves {
            return Err(StorageError::Write("quota exceeded".to_string()).into());
        }
        self.raw = Some(ledger.to_json()?);
        self.save_count += 1;
        Ok(())
    }
}

/// JSONファイルのストア
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    policy: LoadPolicy,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, policy: LoadPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 壊れたファイルの退避先: `<stem>.corrupt.json`
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| STORAGE_KEY.to_string());
        self.path.with_file_name(format!("{}.corrupt.json", stem))
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Read(format!("{}: {}", self.path.display(), e)))?;

        if raw.trim().is_empty() {
            return Ok(Ledger::new());
        }
        match Ledger::from_json(&raw) {
            Ok(ledger) => Ok(ledger),
            Err(e) => {
                if self.policy == LoadPolicy::FailFast {
                    return Err(StorageError::Malformed(e.to_string()).into());
                }
                // 次の保存で上書きされないよう退避しておく
                let backup = self.corrupt_backup_path();
                std::fs::copy(&self.path, &backup)?;
                tracing::warn!(
                    error = %e,
                    backup = %backup.display(),
                    "不正な台帳ファイルを退避し、空の台帳で起動します"
                );
                Ok(Ledger::new())
            }
        }
    }

    fn save(&mut self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(ledger)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| StorageError::Write(format!("{}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StorageError::Write(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!(path = %self.path.display(), records = ledger.total(), "台帳を保存しました");
        Ok(())
    }
}
