use car_damage_check::{cli, config, dispatch, error, export, now_timestamp, open_session};
use car_damage_common::{BoundingBox, Outbox, PhotoDataUri, PointerPos};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use dispatch::{Dispatcher, HttpTransport};
use error::{DamageCheckError, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    if let Some(ledger) = cli.ledger.clone() {
        config.ledger_path = Some(ledger);
    }
    let variant = cli.variant.unwrap_or(config.variant);

    match cli.command {
        Commands::Cars => {
            let variant_config = variant.config();
            println!("🚗 号車一覧 ({})\n", variant);
            for car in variant_config.catalog.keys() {
                println!("  {}", car);
            }
        }

        Commands::Place { car, x, y, width, height, left, top, note, photo, no_dispatch } => {
            println!("📍 car-damage - 傷記録\n");

            let mut session = open_session(&config, variant.config())?;
            session.select(&car)?;
            session.set_note(note);
            if let Some(path) = photo {
                if !path.exists() {
                    return Err(DamageCheckError::FileNotFound(path.display().to_string()));
                }
                session.set_photo(PhotoDataUri::from_file(&path)?);
                println!("✔ 写真を読み込み: {}", path.display());
            }

            let bbox = BoundingBox::new(left, top, width, height);
            let record = session.place(PointerPos::new(x, y), bbox, now_timestamp())?;
            println!(
                "✔ {} #{} に記録: x={:.1}% y={:.1}% メモ: {}",
                car,
                session.records().len() - 1,
                record.x,
                record.y,
                record.note
            );

            let outbox_path = config.outbox_path()?;
            let mut outbox = Outbox::load_file(&outbox_path)?;
            outbox.extend(session.take_outbound());
            outbox.save_file(&outbox_path)?;

            if no_dispatch {
                println!("- 送信待ち: {}件", outbox.len());
            } else {
                run_dispatch(&config, &outbox_path, Vec::new()).await?;
            }

            println!("\n✅ 記録完了");
        }

        Commands::List { car } => {
            let session = open_session(&config, variant.config())?;
            let ledger = session.ledger();
            let cars: Vec<String> = match car {
                Some(car) => vec![car],
                None => ledger.car_ids().map(str::to_string).collect(),
            };

            if cars.is_empty() {
                println!("記録がありません");
            }
            for car in cars {
                let records = ledger.records(&car);
                println!("{} ({}件)", car, records.len());
                for (i, record) in records.iter().enumerate() {
                    println!(
                        "  #{} x={:.1}% y={:.1}% {} [{}] {}",
                        i,
                        record.x,
                        record.y,
                        record.note,
                        if record.has_photo() { "写真あり" } else { "写真なし" },
                        record.tooltip().trim()
                    );
                }
            }
        }

        Commands::Show { car, index } => {
            let mut session = open_session(&config, variant.config())?;
            session.select(&car)?;
            let popup = session.open_popup(index)?;
            println!("{} #{}", car, popup.index);
            let photo = if popup.record.has_photo() {
                format!("🖼 {} (埋め込み画像)", popup.record.photo_url.split(';').next().unwrap_or("data:"))
            } else {
                format!("🖼 {}", popup.record.photo_url)
            };
            println!("{}", photo);
            for line in popup.lines() {
                println!("{}", line);
            }
        }

        Commands::Export { car, diagram, format, output } => {
            println!("📄 car-damage - エクスポート\n");

            let mut session = open_session(&config, variant.config())?;
            session.select(&car)?;
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));

            println!("- {}を生成中... ({}件のマーカー)", format.extension().to_uppercase(), session.records().len());
            let path = export::export_diagram(
                &diagram,
                session.records(),
                session.variant().marker_style,
                &car,
                format,
                &output_dir,
            )?;
            println!("✔ 出力: {}", path.display());

            println!("\n✅ エクスポート完了");
        }

        Commands::Dispatch => {
            let outbox_path = config.outbox_path()?;
            if Outbox::load_file(&outbox_path)?.is_empty() {
                println!("送信待ちはありません");
                return Ok(());
            }
            run_dispatch(&config, &outbox_path, Vec::new()).await?;
        }

        Commands::Config { set_uploader, set_webhook, set_variant, show } => {
            if let Some(uploader) = set_uploader {
                config.set_uploader(uploader)?;
                println!("✔ 記録者を設定しました");
            }

            if let Some(webhook) = set_webhook {
                config.set_webhook(webhook)?;
                println!("✔ Webhookを設定しました");
            }

            if let Some(variant) = set_variant {
                config.set_variant(variant)?;
                println!("✔ バリアントを設定しました");
            }

            if show {
                println!("設定:");
                println!("  記録者: {}", config.uploader);
                println!("  バリアント: {}", config.variant);
                println!("  台帳: {}", config.ledger_path()?.display());
                println!("  送信待ち: {}", config.outbox_path()?.display());
                println!("  スプレッドシート: {}", config.sheet_url);
                println!("  Slack: {}", if config.slack_webhook().is_some() { "設定済み" } else { "未設定（ログ出力のみ）" });
                println!("  再試行: {}回 / タイムアウト {}秒", config.max_attempts, config.timeout_seconds);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 送信待ちに積んで送信する。失敗分は送信待ちファイルに残る
async fn run_dispatch(
    config: &Config,
    outbox_path: &std::path::Path,
    events: Vec<car_damage_common::OutboundEvent>,
) -> Result<()> {
    let settings = config.dispatch_settings();
    let transport = HttpTransport::new(settings.timeout)?;
    let dispatcher = Dispatcher::new(transport, settings);

    println!("- 通知・送信中...");
    let report = dispatcher.flush_outbox(outbox_path, events).await?;
    println!(
        "✔ 送信: 成功 {} / ログのみ {} / 失敗 {}",
        report.delivered, report.logged_only, report.failed
    );
    if report.failed > 0 {
        println!("- 失敗した{}件は送信待ちに残しました", report.failed);
    }
    Ok(())
}
