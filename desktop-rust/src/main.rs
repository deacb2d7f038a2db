mod app;
mod io;
mod model;

use app::{configure_fonts, DesktopApp};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = io::load_config()?;
    let session = io::open_damage_session(&config)?;
    let app = DesktopApp::new(config, session);

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "車両傷チェック",
        options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("ウィンドウを開けません: {e}"))
}
