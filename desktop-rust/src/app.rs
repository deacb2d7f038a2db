use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

use eframe::egui::{self, Align2, Color32, FontId, RichText, Rounding, Stroke};
use eframe::egui::{FontData, FontDefinitions, FontFamily};

use car_damage_check::config::Config;
use car_damage_check::dispatch::{Dispatcher, HttpTransport};
use car_damage_check::{export, now_timestamp};
use car_damage_common::{
    export_file_name, hit_test, BoundingBox, ClickOutcome, DamageSession, ExportFormat,
    JsonFileStore, OutboundEvent, Outbox, PhotoDataUri, PointerPos,
};

use crate::io::{load_diagram_pixels, load_photo_pixels};
use crate::model::{PixelData, UiMessage};

const DIAGRAM_MAX_WIDTH: f32 = 720.0;

pub struct DesktopApp {
    config: Config,
    session: DamageSession<JsonFileStore>,
    note: String,
    photo_name: Option<String>,
    diagram_path: Option<PathBuf>,
    diagram: Option<egui::TextureHandle>,
    photo_textures: HashMap<String, egui::TextureHandle>,
    export_format: ExportFormat,
    status: String,
    export_status: String,
    dispatch_status: String,
    export_rx: Option<Receiver<UiMessage>>,
    dispatch_rx: Option<Receiver<UiMessage>>,
    exporting: bool,
    dispatching: bool,
    /// 送信待ちファイルを扱うワーカーを1つずつ動かす
    outbox_lock: Arc<Mutex<()>>,
}

impl DesktopApp {
    pub fn new(config: Config, session: DamageSession<JsonFileStore>) -> Self {
        Self {
            config,
            session,
            note: String::new(),
            photo_name: None,
            diagram_path: None,
            diagram: None,
            photo_textures: HashMap::new(),
            export_format: ExportFormat::default(),
            status: String::new(),
            export_status: String::new(),
            dispatch_status: String::new(),
            export_rx: None,
            dispatch_rx: None,
            exporting: false,
            dispatching: false,
            outbox_lock: Arc::new(Mutex::new(())),
        }
    }

    fn open_diagram(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Image", &["png", "jpg", "jpeg", "webp"])
            .pick_file()
        else {
            return;
        };
        match load_diagram_pixels(&path) {
            Ok(data) => {
                self.diagram = Some(load_texture(ctx, "diagram", data));
                self.status = format!("図を読み込みました: {}", path.display());
                self.diagram_path = Some(path);
            }
            Err(err) => self.status = format!("図の読み込みに失敗: {err:#}"),
        }
    }

    fn pick_photo(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Image", &["png", "jpg", "jpeg", "gif", "webp", "heic"])
            .pick_file()
        else {
            return;
        };
        match PhotoDataUri::from_file(&path) {
            Ok(photo) => {
                self.session.set_photo(photo);
                self.photo_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            }
            Err(err) => self.status = format!("写真の読み込みに失敗: {err}"),
        }
    }

    fn select_car(&mut self, car: &str) {
        match self.session.select(car) {
            Ok(()) => self.status.clear(),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn handle_click(&mut self, pointer: PointerPos, bbox: BoundingBox) {
        self.session.set_note(self.note.clone());
        match self.session.click(pointer, bbox, now_timestamp()) {
            Ok(ClickOutcome::OpenedPopup(_)) => {}
            Ok(ClickOutcome::Placed(record)) => {
                self.note.clear();
                self.photo_name = None;
                self.status = format!("{} に記録しました ({:.1}%, {:.1}%)", self.session.selected(), record.x, record.y);
                let events = self.session.take_outbound();
                self.run_dispatch(events);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn render_diagram(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width().min(DIAGRAM_MAX_WIDTH);
        let aspect = self
            .diagram
            .as_ref()
            .map(|t| {
                let size = t.size_vec2();
                size.y / size.x
            })
            .unwrap_or(0.5);
        let (rect, response) = ui.allocate_exact_size(egui::vec2(width, width * aspect), egui::Sense::click());
        let painter = ui.painter_at(rect);

        match &self.diagram {
            Some(texture) => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
            None => {
                painter.rect_filled(rect, Rounding::same(8.0), Color32::from_gray(235));
                painter.rect_stroke(
                    rect.shrink(rect.height() * 0.15),
                    Rounding::same(rect.height() * 0.2),
                    Stroke::new(2.0, Color32::from_gray(120)),
                );
                painter.text(rect.center(), Align2::CENTER_CENTER, "車両図", FontId::proportional(18.0), Color32::from_gray(120));
            }
        }

        let bbox = BoundingBox::new(rect.left() as f64, rect.top() as f64, rect.width() as f64, rect.height() as f64);
        let markers = self.session.markers();
        for marker in &markers {
            let center = marker.center_in(&bbox);
            let pos = egui::pos2(center.client_x as f32, center.client_y as f32);
            let radius = (marker.style.diameter_px() / 2.0) as f32;
            let [r, g, b] = marker.style.color();
            painter.circle_filled(pos, radius, Color32::from_rgb(r, g, b));
            if !marker.label.is_empty() {
                painter.text(pos, Align2::CENTER_CENTER, marker.label, FontId::proportional(radius * 1.2), Color32::WHITE);
            }
        }

        if let Some(hover) = response.hover_pos() {
            let pointer = PointerPos::new(hover.x as f64, hover.y as f64);
            if let Some(index) = hit_test(&markers, pointer, &bbox) {
                let tooltip = markers[index].tooltip.clone();
                egui::show_tooltip_at_pointer(ui.ctx(), egui::Id::new("marker_tooltip"), |ui| {
                    ui.label(tooltip);
                });
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.handle_click(PointerPos::new(pos.x as f64, pos.y as f64), bbox);
            }
        }
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("メモ");
            ui.add(egui::TextEdit::singleline(&mut self.note).hint_text("傷の内容"));
        });
        ui.horizontal(|ui| {
            let label = if self.session.variant().require_photo { "写真（必須）" } else { "写真" };
            if ui.button(label).clicked() {
                self.pick_photo();
            }
            match &self.photo_name {
                Some(name) => {
                    ui.label(name.as_str());
                    if ui.small_button("✕").clicked() {
                        self.session.clear_photo();
                        self.photo_name = None;
                    }
                }
                None => {
                    ui.label(RichText::new("未選択").color(Color32::from_gray(150)));
                }
            }
        });
        ui.label(RichText::new("図をクリックすると傷を記録します").size(12.0).color(Color32::from_gray(150)));
    }

    fn render_popup(&mut self, ctx: &egui::Context) {
        let Some(target) = self.session.popup().cloned() else {
            return;
        };
        let key = format!("{}#{}", self.session.selected(), target.index);
        if target.record.has_photo() && !self.photo_textures.contains_key(&key) {
            match load_photo_pixels(&target.record.photo_url) {
                Ok(data) => {
                    let texture = load_texture(ctx, &key, data);
                    self.photo_textures.insert(key.clone(), texture);
                }
                Err(err) => tracing::warn!(error = %err, "写真を表示できません"),
            }
        }

        let mut open = true;
        egui::Window::new(format!("{} #{}", self.session.selected(), target.index))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                match self.photo_textures.get(&key) {
                    Some(texture) => {
                        ui.add(egui::Image::new(texture).max_width(240.0));
                    }
                    None => {
                        ui.hyperlink(&target.record.photo_url);
                    }
                }
                for line in target.lines() {
                    ui.label(line);
                }
            });
        if !open {
            self.session.close_popup();
        }
    }

    fn run_export(&mut self, format: ExportFormat) {
        let Some(diagram) = self.diagram_path.clone() else {
            self.export_status = "図が読み込まれていません".to_string();
            return;
        };
        let car = self.session.selected().to_string();
        let Some(output) = rfd::FileDialog::new()
            .set_file_name(export_file_name(&car, format))
            .save_file()
        else {
            return;
        };

        let records = self.session.records().to_vec();
        let style = self.session.variant().marker_style;
        let (tx, rx) = mpsc::channel();
        self.export_rx = Some(rx);
        self.exporting = true;
        self.export_status = "出力中...".to_string();

        std::thread::spawn(move || {
            let message = match export::export_diagram(&diagram, &records, style, &car, format, &output) {
                Ok(path) => format!("出力しました: {}", path.display()),
                Err(err) => format!("出力に失敗: {err}"),
            };
            let _ = tx.send(UiMessage::ExportDone { message });
        });
    }

    /// 送信待ちファイルに積んでから、まとめて送信する
    fn run_dispatch(&mut self, events: Vec<OutboundEvent>) {
        let outbox_path = match self.config.outbox_path() {
            Ok(path) => path,
            Err(err) => {
                self.dispatch_status = format!("送信待ちを保存できません: {err}");
                return;
            }
        };
        let settings = self.config.dispatch_settings();
        let (tx, rx) = mpsc::channel();
        self.dispatch_rx = Some(rx);
        self.dispatching = true;
        self.dispatch_status = "送信中...".to_string();

        let outbox_lock = Arc::clone(&self.outbox_lock);

        std::thread::spawn(move || {
            let result = (|| -> anyhow::Result<_> {
                let _guard = outbox_lock
                    .lock()
                    .map_err(|_| anyhow::anyhow!("送信待ちのロックが壊れています"))?;
                let mut outbox = Outbox::load_file(&outbox_path)?;
                outbox.extend(events);
                outbox.save_file(&outbox_path)?;

                let runtime = tokio::runtime::Runtime::new()?;
                let transport = HttpTransport::new(settings.timeout)?;
                let dispatcher = Dispatcher::new(transport, settings);
                Ok(runtime.block_on(dispatcher.flush_outbox(&outbox_path, Vec::new()))?)
            })();

            let message = match result {
                Ok(report) => UiMessage::DispatchDone { report: Some(report), error: None },
                Err(err) => UiMessage::DispatchDone { report: None, error: Some(format!("{err:#}")) },
            };
            let _ = tx.send(message);
        });
    }

    fn poll_messages(&mut self) {
        if let Some(rx) = &self.export_rx {
            if let Ok(UiMessage::ExportDone { message }) = rx.try_recv() {
                self.export_status = message;
                self.exporting = false;
                self.export_rx = None;
            }
        }

        if let Some(rx) = &self.dispatch_rx {
            if let Ok(UiMessage::DispatchDone { report, error }) = rx.try_recv() {
                self.dispatch_status = match (report, error) {
                    (Some(report), _) => format!(
                        "送信: 成功 {} / ログのみ {} / 失敗 {}",
                        report.delivered, report.logged_only, report.failed
                    ),
                    (None, Some(error)) => format!("送信に失敗: {error}"),
                    (None, None) => String::new(),
                };
                self.dispatching = false;
                self.dispatch_rx = None;
            }
        }
    }
}

fn load_texture(ctx: &egui::Context, name: &str, data: PixelData) -> egui::TextureHandle {
    let color_image = egui::ColorImage::from_rgba_unmultiplied(data.size, &data.pixels);
    ctx.load_texture(name, color_image, egui::TextureOptions::default())
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("jp_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .insert(0, "jp_fallback".to_string());
            fonts.families
                .entry(FontFamily::Monospace)
                .or_default()
                .insert(0, "jp_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.exporting || self.dispatching {
            ctx.request_repaint();
        }
        self.poll_messages();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("ファイル", |ui| {
                    if ui.button("図を開く").clicked() {
                        self.open_diagram(ui.ctx());
                        ui.close_menu();
                    }
                });

                ui.menu_button("エクスポート", |ui| {
                    ui.radio_value(&mut self.export_format, ExportFormat::Pdf, "PDF");
                    ui.radio_value(&mut self.export_format, ExportFormat::Png, "PNG");
                    let enabled = self.diagram_path.is_some() && !self.exporting;
                    if ui.add_enabled(enabled, egui::Button::new("出力")).clicked() {
                        self.run_export(self.export_format);
                        ui.close_menu();
                    }
                });

                ui.separator();
                if !self.dispatch_status.is_empty() {
                    ui.label(RichText::new(&self.dispatch_status).color(Color32::from_gray(170)));
                }
                if !self.export_status.is_empty() {
                    ui.label(RichText::new(&self.export_status).color(Color32::from_rgb(246, 196, 69)));
                }
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::SidePanel::left("cars").resizable(true).show(ctx, |ui| {
            ui.heading("号車");
            let mut selected = self.session.selected().to_string();
            egui::ComboBox::from_id_source("car_select")
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for car in self.session.car_ids() {
                        ui.selectable_value(&mut selected, car.clone(), car.as_str());
                    }
                });
            if selected != self.session.selected() {
                self.select_car(&selected);
            }
            ui.label(format!("{}件の記録", self.session.records().len()));
            ui.separator();
            self.render_form(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("{} の傷チェック", self.session.selected()));
            ui.separator();
            self.render_diagram(ui);
        });

        self.render_popup(ctx);
    }
}
