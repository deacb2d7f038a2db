//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use car_damage_check::error::DamageCheckError;
use car_damage_common::{StorageError, ValidationError};

/// DamageCheckErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        DamageCheckError::Config("テスト設定エラー".to_string()),
        DamageCheckError::FileNotFound("car-top-view.png".to_string()),
        ValidationError::PhotoRequired.into(),
        ValidationError::UnknownVehicle("99号車".to_string()).into(),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 検証エラーは透過的に表示される
#[test]
fn test_validation_error_is_transparent() {
    let err: DamageCheckError = ValidationError::PhotoRequired.into();
    assert_eq!(format!("{}", err), "写真を選択してください");
}

/// 保存エラーの変換
#[test]
fn test_storage_error_conversion() {
    let common_err: car_damage_common::Error = StorageError::Write("disk full".to_string()).into();
    let err: DamageCheckError = common_err.into();

    assert!(matches!(err, DamageCheckError::Common(car_damage_common::Error::Storage(_))));
    assert!(format!("{}", err).contains("disk full"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: DamageCheckError = io_err.into();

    assert!(matches!(err, DamageCheckError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: DamageCheckError = json_err.into();

    assert!(matches!(err, DamageCheckError::JsonParse(_)));
}
