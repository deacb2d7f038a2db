use thiserror::Error;

#[derive(Error, Debug)]
pub enum DamageCheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("送信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] car_damage_common::Error),
}

impl From<car_damage_common::ValidationError> for DamageCheckError {
    fn from(err: car_damage_common::ValidationError) -> Self {
        DamageCheckError::Common(err.into())
    }
}

impl From<car_damage_common::ExportError> for DamageCheckError {
    fn from(err: car_damage_common::ExportError) -> Self {
        DamageCheckError::Common(err.into())
    }
}

pub type Result<T> = std::result::Result<T, DamageCheckError>;
