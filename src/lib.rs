//! 車両傷記録ツール
//!
//! CLI・デスクトップ版から使う台帳操作・送信・図面出力

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod export;

use car_damage_common::{DamageSession, JsonFileStore, VariantConfig, TIMESTAMP_FORMAT};
use config::Config;
use error::Result;

/// 設定に従ってファイル台帳のセッションを開く
pub fn open_session(config: &Config, variant: VariantConfig) -> Result<DamageSession<JsonFileStore>> {
    let store = JsonFileStore::new(config.ledger_path()?, config.load_policy);
    let mut session = DamageSession::open(variant, store)?;
    session.set_uploader(config.uploader.clone());
    Ok(session)
}

/// 記録日時（ローカル時刻）
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
