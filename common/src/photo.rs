//! 写真の取り込み（Data URI化）
//!
//! 選択された画像をまるごと読み込み、`data:<mime>;base64,...` として保持する。
//! サイズ・形式のチェックは行わない。

use crate::error::{Result, ValidationError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// 配置待ちの写真（Data URI）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoDataUri(String);

impl PhotoDataUri {
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Self {
        Self(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
    }

    /// ファイルを読み込んでData URI化
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "写真を読み込みました");
        Ok(Self::from_bytes(&bytes, mime_for_path(path)))
    }

    /// 既存のData URI文字列（FileReader.readAsDataURL の結果など）を受け取る
    pub fn parse(uri: impl Into<String>) -> std::result::Result<Self, ValidationError> {
        let uri = uri.into();
        split_data_uri(&uri)?;
        Ok(Self(uri))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn mime(&self) -> &str {
        split_data_uri(&self.0).map(|(mime, _)| mime).unwrap_or("application/octet-stream")
    }
}

/// 拡張子からMIMEタイプを推定
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Data URIをデコードして (MIMEタイプ, バイト列) を返す
pub fn decode_data_uri(uri: &str) -> std::result::Result<(String, Vec<u8>), ValidationError> {
    let (mime, payload) = split_data_uri(uri)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ValidationError::InvalidDataUri(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}

fn split_data_uri(uri: &str) -> std::result::Result<(&str, &str), ValidationError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ValidationError::InvalidDataUri("data: で始まっていません".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ValidationError::InvalidDataUri("',' がありません".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ValidationError::InvalidDataUri("base64 形式ではありません".to_string()))?;
    Ok((mime, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_bytes() {
        let photo = PhotoDataUri::from_bytes(b"abc", "image/png");
        assert_eq!(photo.as_str(), "data:image/png;base64,YWJj");
        assert_eq!(photo.mime(), "image/png");
    }

    #[test]
    fn test_decode_data_uri() {
        let (mime, bytes) = decode_data_uri("data:image/jpeg;base64,YWJj").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn test_parse_rejects_plain_url() {
        assert!(PhotoDataUri::parse("https://via.placeholder.com/150").is_err());
        assert!(PhotoDataUri::parse("data:image/png,raw").is_err());
        assert!(PhotoDataUri::parse("data:image/png;base64,YWJj").is_ok());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(&PathBuf::from("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(&PathBuf::from("b.webp")), "image/webp");
        assert_eq!(mime_for_path(&PathBuf::from("c")), "application/octet-stream");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("scratch.png");
        std::fs::write(&path, b"fake png").unwrap();

        let photo = PhotoDataUri::from_file(&path).expect("読み込み失敗");
        assert!(photo.as_str().starts_with("data:image/png;base64,"));
        let (_, bytes) = decode_data_uri(photo.as_str()).unwrap();
        assert_eq!(bytes, b"fake png");
    }
}
