//! 号車リストと画面バリアント設定
//!
//! 号車数・写真必須・マーカー表示の3点だけが異なる画面を、
//! 1つの設定で切り替える。

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// 号車キーの一覧（固定）
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCatalog {
    keys: Vec<String>,
}

impl VehicleCatalog {
    /// "1号車" 〜 "{count}号車"
    pub fn numbered(count: usize) -> Self {
        Self {
            keys: (1..=count.max(1)).map(|i| format!("{}号車", i)).collect(),
        }
    }

    pub fn from_keys(keys: Vec<String>) -> Result<Self, ValidationError> {
        if keys.is_empty() {
            return Err(ValidationError::EmptyCatalog);
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// 初期選択
    pub fn first(&self) -> &str {
        &self.keys[0]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// マーカーの描き方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// 赤丸に「!」
    #[default]
    Badge,
    /// 小さい赤丸のみ
    Dot,
}

impl MarkerStyle {
    /// 基準表示幅（512px）でのマーカー直径
    pub fn diameter_px(&self) -> f64 {
        match self {
            MarkerStyle::Badge => 24.0,
            MarkerStyle::Dot => 12.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarkerStyle::Badge => "!",
            MarkerStyle::Dot => "",
        }
    }

    /// RGB
    pub fn color(&self) -> [u8; 3] {
        [220, 38, 38]
    }
}

/// 画面バリアント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Standard,
    PhotoRequired,
    Compact,
}

impl Variant {
    pub fn config(&self) -> VariantConfig {
        match self {
            Variant::Standard => VariantConfig {
                catalog: VehicleCatalog::numbered(25),
                require_photo: false,
                marker_style: MarkerStyle::Badge,
            },
            Variant::PhotoRequired => VariantConfig {
                catalog: VehicleCatalog::numbered(25),
                require_photo: true,
                marker_style: MarkerStyle::Badge,
            },
            Variant::Compact => VariantConfig {
                catalog: VehicleCatalog::numbered(3),
                require_photo: false,
                marker_style: MarkerStyle::Dot,
            },
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Variant::Standard),
            "photo_required" | "photo" => Ok(Variant::PhotoRequired),
            "compact" => Ok(Variant::Compact),
            _ => Err(format!(
                "Unknown variant: {}. Use standard, photo-required, or compact",
                s
            )),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Standard => write!(f, "standard"),
            Variant::PhotoRequired => write!(f, "photo-required"),
            Variant::Compact => write!(f, "compact"),
        }
    }
}

/// 画面の構成パラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConfig {
    pub catalog: VehicleCatalog,
    /// 配置前に写真の選択を必須にする
    pub require_photo: bool,
    pub marker_style: MarkerStyle,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Variant::Standard.config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_catalog() {
        let catalog = VehicleCatalog::numbered(25);
        assert_eq!(catalog.len(), 25);
        assert_eq!(catalog.first(), "1号車");
        assert_eq!(catalog.keys()[24], "25号車");
        assert!(catalog.contains("13号車"));
        assert!(!catalog.contains("26号車"));
    }

    #[test]
    fn test_from_keys_rejects_empty() {
        assert_eq!(VehicleCatalog::from_keys(vec![]), Err(ValidationError::EmptyCatalog));
    }

    #[test]
    fn test_variant_presets() {
        assert!(!Variant::Standard.config().require_photo);
        assert!(Variant::PhotoRequired.config().require_photo);
        assert_eq!(Variant::Compact.config().catalog.len(), 3);
        assert_eq!(Variant::Compact.config().marker_style, MarkerStyle::Dot);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("photo-required".parse::<Variant>(), Ok(Variant::PhotoRequired));
        assert_eq!("Compact".parse::<Variant>(), Ok(Variant::Compact));
        assert!("sedan".parse::<Variant>().is_err());
    }
}
