use anyhow::{Context, Result};
use std::path::Path;

use car_damage_check::config::Config;
use car_damage_check::open_session;
use car_damage_common::{decode_data_uri, DamageSession, JsonFileStore};

use crate::model::PixelData;

pub fn load_config() -> Result<Config> {
    Config::load().context("load config")
}

pub fn open_damage_session(config: &Config) -> Result<DamageSession<JsonFileStore>> {
    let ledger = config.ledger_path().context("resolve ledger path")?;
    open_session(config, config.variant.config())
        .with_context(|| format!("open ledger {}", ledger.display()))
}

pub fn load_diagram_pixels(path: &Path) -> Result<PixelData> {
    let image = image::open(path).with_context(|| format!("read {}", path.display()))?;
    Ok(to_pixels(image))
}

/// 埋め込み写真（data URI）を縮小して読み込む
pub fn load_photo_pixels(data_uri: &str) -> Result<PixelData> {
    let (_, bytes) = decode_data_uri(data_uri).context("decode photo")?;
    let image = image::load_from_memory(&bytes).context("parse photo")?;
    Ok(to_pixels(image.thumbnail(240, 240)))
}

fn to_pixels(image: image::DynamicImage) -> PixelData {
    let rgba = image.to_rgba8();
    PixelData {
        size: [rgba.width() as usize, rgba.height() as usize],
        pixels: rgba.into_raw(),
    }
}
