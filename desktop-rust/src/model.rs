use car_damage_check::dispatch::DispatchReport;

/// ワーカースレッドからの通知
pub enum UiMessage {
    ExportDone { message: String },
    DispatchDone { report: Option<DispatchReport>, error: Option<String> },
}

/// テクスチャ化前のRGBA画像
pub struct PixelData {
    pub size: [usize; 2],
    pub pixels: Vec<u8>,
}
