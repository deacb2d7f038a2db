//! 傷記録画面の状態と配置ハンドラ
//!
//! 号車選択・台帳・入力中のメモ/写真・ポップアップ・送信待ちキューを1つにまとめ、
//! 永続化は LedgerStore 越しに行う。UIはこの型を操作して再描画するだけ。

use crate::catalog::VariantConfig;
use crate::error::{Result, ValidationError};
use crate::geometry::{BoundingBox, PointerPos};
use crate::marker::{hit_test, markers_for, Marker, Popup, PopupTarget};
use crate::outbox::{events_for, OutboundEvent, Outbox};
use crate::photo::PhotoDataUri;
use crate::store::LedgerStore;
use crate::types::{DamageRecord, Ledger, DEFAULT_NOTE, DEFAULT_UPLOADER, PLACEHOLDER_PHOTO_URL};

/// 次の配置クリックで使うメモと写真
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingInput {
    pub note: String,
    pub photo: Option<PhotoDataUri>,
}

impl PendingInput {
    pub fn clear(&mut self) {
        self.note.clear();
        self.photo = None;
    }
}

/// 図クリックの結果
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// マーカー上のクリック → ポップアップを開いた
    OpenedPopup(usize),
    /// 新しい記録を追加した
    Placed(DamageRecord),
}

pub struct DamageSession<S> {
    variant: VariantConfig,
    selected: String,
    ledger: Ledger,
    store: S,
    pending: PendingInput,
    popup: Popup,
    outbox: Outbox,
    uploader: String,
}

impl<S: LedgerStore> DamageSession<S> {
    /// ストアから台帳を読み込んで開始
    pub fn open(variant: VariantConfig, store: S) -> Result<Self> {
        let ledger = store.load()?;
        tracing::info!(records = ledger.total(), "台帳を読み込みました");
        let selected = variant.catalog.first().to_string();
        Ok(Self {
            variant,
            selected,
            ledger,
            store,
            pending: PendingInput::default(),
            popup: Popup::default(),
            outbox: Outbox::default(),
            uploader: DEFAULT_UPLOADER.to_string(),
        })
    }

    pub fn variant(&self) -> &VariantConfig {
        &self.variant
    }

    /// 選択可能な号車
    pub fn car_ids(&self) -> &[String] {
        self.variant.catalog.keys()
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// 号車を切り替える。台帳には触れない
    pub fn select(&mut self, car_id: &str) -> std::result::Result<(), ValidationError> {
        if !self.variant.catalog.contains(car_id) {
            return Err(ValidationError::UnknownVehicle(car_id.to_string()));
        }
        if self.selected != car_id {
            self.selected = car_id.to_string();
            self.popup.close();
        }
        Ok(())
    }

    pub fn set_uploader(&mut self, uploader: impl Into<String>) {
        self.uploader = uploader.into();
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.pending.note = note.into();
    }

    pub fn set_photo(&mut self, photo: PhotoDataUri) {
        self.pending.photo = Some(photo);
    }

    pub fn clear_photo(&mut self) {
        self.pending.photo = None;
    }

    pub fn pending(&self) -> &PendingInput {
        &self.pending
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// 選択中の号車の記録
    pub fn records(&self) -> &[DamageRecord] {
        self.ledger.records(&self.selected)
    }

    pub fn markers(&self) -> Vec<Marker> {
        markers_for(self.records(), self.variant.marker_style)
    }

    /// 図上のクリックを記録として追加する
    ///
    /// 保存に失敗した場合は追加を取り消し、入力中のメモ/写真は残す。
    pub fn place(
        &mut self,
        pointer: PointerPos,
        bbox: BoundingBox,
        timestamp: impl Into<String>,
    ) -> Result<DamageRecord> {
        if self.variant.require_photo && self.pending.photo.is_none() {
            return Err(ValidationError::PhotoRequired.into());
        }
        let (x, y) = bbox.to_percent(pointer)?;

        let note = if self.pending.note.is_empty() {
            DEFAULT_NOTE.to_string()
        } else {
            self.pending.note.clone()
        };
        let photo_url = self
            .pending
            .photo
            .as_ref()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| PLACEHOLDER_PHOTO_URL.to_string());

        let record = DamageRecord {
            x,
            y,
            note,
            photo_url,
            timestamp: Some(timestamp.into()),
            uploader: Some(self.uploader.clone()),
        };

        let car_id = self.selected.clone();
        let index = self.ledger.append(&car_id, record.clone());
        if let Err(e) = self.store.save(&self.ledger) {
            self.ledger.pop_last(&car_id);
            tracing::warn!(car = %car_id, error = %e, "保存に失敗したため記録を取り消しました");
            return Err(e);
        }

        self.pending.clear();
        self.outbox.extend(events_for(&car_id, &record));
        tracing::info!(car = %car_id, index, x, y, "傷記録を追加しました");
        Ok(record)
    }

    /// 図上のクリック: マーカー上ならポップアップ、それ以外は配置
    pub fn click(
        &mut self,
        pointer: PointerPos,
        bbox: BoundingBox,
        timestamp: impl Into<String>,
    ) -> Result<ClickOutcome> {
        if let Some(index) = hit_test(&self.markers(), pointer, &bbox) {
            self.open_popup(index)?;
            return Ok(ClickOutcome::OpenedPopup(index));
        }
        self.place(pointer, bbox, timestamp).map(ClickOutcome::Placed)
    }

    /// 選択中の号車の index 番目の記録を表示
    pub fn open_popup(&mut self, index: usize) -> std::result::Result<&PopupTarget, ValidationError> {
        let record = self
            .records()
            .get(index)
            .cloned()
            .ok_or_else(|| ValidationError::RecordNotFound {
                car: self.selected.clone(),
                index,
            })?;
        self.popup.open(index, record);
        self.popup.current().ok_or_else(|| ValidationError::RecordNotFound {
            car: self.selected.clone(),
            index,
        })
    }

    pub fn close_popup(&mut self) {
        self.popup.close();
    }

    pub fn popup(&self) -> Option<&PopupTarget> {
        self.popup.current()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// 送信待ちイベントを取り出す（ディスパッチャへ渡す）
    pub fn take_outbound(&mut self) -> Vec<OutboundEvent> {
        self.outbox.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Variant;
    use crate::error::{Error, StorageError};
    use crate::store::{LoadPolicy, MemoryStore};

    const TS: &str = "2026/01/18 10:00:00";

    fn session(variant: Variant) -> DamageSession<MemoryStore> {
        DamageSession::open(variant.config(), MemoryStore::new()).expect("open失敗")
    }

    fn box200() -> BoundingBox {
        BoundingBox::from_size(200.0, 200.0)
    }

    #[test]
    fn test_default_selection_is_first_car() {
        let s = session(Variant::Standard);
        assert_eq!(s.selected(), "1号車");
        assert_eq!(s.car_ids().len(), 25);
    }

    #[test]
    fn test_place_scratch_scenario() {
        let mut s = session(Variant::Standard);
        s.select("1号車").unwrap();
        s.set_note("scratch");

        let record = s.place(PointerPos::new(50.0, 50.0), box200(), TS).unwrap();
        assert_eq!(record.x, 25.0);
        assert_eq!(record.y, 25.0);
        assert_eq!(record.note, "scratch");
        assert_eq!(record.photo_url, PLACEHOLDER_PHOTO_URL);
        assert_eq!(record.uploader.as_deref(), Some(DEFAULT_UPLOADER));
        assert_eq!(s.records().len(), 1);

        let popup = s.open_popup(0).unwrap();
        assert_eq!(popup.record.note, "scratch");
    }

    #[test]
    fn test_place_clears_pending_and_queues_events() {
        let mut s = session(Variant::Standard);
        s.set_note("dent");
        s.set_photo(PhotoDataUri::from_bytes(b"img", "image/png"));
        s.place(PointerPos::new(10.0, 10.0), box200(), TS).unwrap();

        assert_eq!(s.pending(), &PendingInput::default());
        let events = s.take_outbound();
        assert_eq!(events.len(), 2);
        assert!(s.outbox().is_empty());
    }

    #[test]
    fn test_empty_note_uses_default() {
        let mut s = session(Variant::Standard);
        let record = s.place(PointerPos::new(0.0, 0.0), box200(), TS).unwrap();
        assert_eq!(record.note, DEFAULT_NOTE);
    }

    #[test]
    fn test_photo_required_blocks_without_photo() {
        let mut s = session(Variant::PhotoRequired);
        let err = s.place(PointerPos::new(50.0, 50.0), box200(), TS).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::PhotoRequired)));
        assert!(s.ledger().is_empty());
        assert_eq!(s.store().save_count(), 0);

        let photo = PhotoDataUri::from_bytes(b"jpeg bytes", "image/jpeg");
        s.set_photo(photo.clone());
        let record = s.place(PointerPos::new(50.0, 50.0), box200(), TS).unwrap();
        assert_eq!(record.photo_url, photo.as_str());
        assert_eq!(s.records().len(), 1);
    }

    #[test]
    fn test_append_only_and_isolated_by_car() {
        let mut s = session(Variant::Standard);
        s.place(PointerPos::new(20.0, 20.0), box200(), TS).unwrap();
        let first = s.records()[0].clone();

        s.select("2号車").unwrap();
        assert!(s.records().is_empty());
        s.place(PointerPos::new(100.0, 100.0), box200(), TS).unwrap();

        s.select("1号車").unwrap();
        s.place(PointerPos::new(40.0, 40.0), box200(), TS).unwrap();

        assert_eq!(s.records().len(), 2);
        assert_eq!(s.records()[0], first);
        assert_eq!(s.ledger().records("2号車").len(), 1);
    }

    #[test]
    fn test_select_unknown_car() {
        let mut s = session(Variant::Compact);
        let err = s.select("4号車").unwrap_err();
        assert_eq!(err, ValidationError::UnknownVehicle("4号車".to_string()));
        assert_eq!(s.selected(), "1号車");
    }

    #[test]
    fn test_select_closes_popup_but_keeps_ledger() {
        let mut s = session(Variant::Standard);
        s.place(PointerPos::new(20.0, 20.0), box200(), TS).unwrap();
        s.open_popup(0).unwrap();
        let before = s.ledger().clone();

        s.select("7号車").unwrap();
        assert!(s.popup().is_none());
        assert_eq!(s.ledger(), &before);
    }

    #[test]
    fn test_save_failure_rolls_back() {
        let mut s = session(Variant::Standard);
        s.set_note("keep me");
        s.store_mut().set_fail_saves(true);

        let err = s.place(PointerPos::new(20.0, 20.0), box200(), TS).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Write(_))));
        assert!(s.ledger().is_empty());
        assert_eq!(s.pending().note, "keep me");
        assert!(s.outbox().is_empty());
    }

    #[test]
    fn test_reload_reproduces_ledger() {
        let mut s = session(Variant::Standard);
        s.set_note("scratch");
        s.place(PointerPos::new(50.0, 50.0), box200(), TS).unwrap();
        s.place(PointerPos::new(150.0, 10.0), box200(), TS).unwrap();

        let raw = s.store().raw().expect("保存されていない").to_string();
        let reopened = DamageSession::open(
            Variant::Standard.config(),
            MemoryStore::with_raw(raw, Default::default()),
        )
        .unwrap();
        assert_eq!(reopened.records(), s.records());
    }

    #[test]
    fn test_non_finite_click_keeps_ledger_loadable() {
        let mut s = session(Variant::Standard);
        s.place(PointerPos::new(50.0, 50.0), box200(), TS).unwrap();
        let queued = s.outbox().len();

        let err = s.place(PointerPos::new(f64::INFINITY, 50.0), box200(), TS).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::NonFinitePointer { .. })));
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.store().save_count(), 1);
        assert_eq!(s.outbox().len(), queued);

        let raw = s.store().raw().expect("保存されていない").to_string();
        assert!(!raw.contains("null"));
        let reopened = DamageSession::open(
            Variant::Standard.config(),
            MemoryStore::with_raw(raw, LoadPolicy::FailFast),
        )
        .unwrap();
        assert_eq!(reopened.records(), s.records());
    }

    #[test]
    fn test_click_on_marker_opens_popup() {
        let mut s = session(Variant::Standard);
        s.set_note("scratch");
        s.place(PointerPos::new(50.0, 50.0), box200(), TS).unwrap();

        let outcome = s.click(PointerPos::new(52.0, 49.0), box200(), TS).unwrap();
        assert_eq!(outcome, ClickOutcome::OpenedPopup(0));
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.popup().map(|p| p.record.note.as_str()), Some("scratch"));

        let outcome = s.click(PointerPos::new(150.0, 150.0), box200(), TS).unwrap();
        assert!(matches!(outcome, ClickOutcome::Placed(_)));
        assert_eq!(s.records().len(), 2);
    }

    #[test]
    fn test_open_popup_out_of_range() {
        let mut s = session(Variant::Standard);
        assert!(matches!(
            s.open_popup(3),
            Err(ValidationError::RecordNotFound { index: 3, .. })
        ));
    }
}
