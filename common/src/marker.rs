//! マーカー表示とポップアップ

use crate::catalog::MarkerStyle;
use crate::geometry::{BoundingBox, PointerPos};
use crate::types::DamageRecord;

/// マーカー直径の基準になる図の表示幅（max-w-lg 相当）
pub const REFERENCE_WIDTH_PX: f64 = 512.0;

/// 1件の記録に対応するマーカー
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// 号車内の記録インデックス
    pub index: usize,
    pub x_pct: f64,
    pub y_pct: f64,
    pub label: &'static str,
    pub tooltip: String,
    pub style: MarkerStyle,
}

impl Marker {
    /// 現在の表示矩形でのマーカー中心
    pub fn center_in(&self, bbox: &BoundingBox) -> PointerPos {
        bbox.from_percent(self.x_pct, self.y_pct)
    }

    /// CSS用の位置指定（translate(-50%,-50%) と組み合わせる）
    pub fn css_position(&self) -> String {
        format!("top: {}%; left: {}%;", self.y_pct, self.x_pct)
    }

    fn hit(&self, pointer: PointerPos, bbox: &BoundingBox) -> bool {
        let center = self.center_in(bbox);
        let radius = self.style.diameter_px() / 2.0;
        let dx = pointer.client_x - center.client_x;
        let dy = pointer.client_y - center.client_y;
        dx * dx + dy * dy <= radius * radius
    }
}

/// 号車の記録からマーカー一覧を作る（記録順 = 描画順）
pub fn markers_for(records: &[DamageRecord], style: MarkerStyle) -> Vec<Marker> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| Marker {
            index,
            x_pct: record.x,
            y_pct: record.y,
            label: style.label(),
            tooltip: record.tooltip(),
            style,
        })
        .collect()
}

/// ポインタ下のマーカー。重なっている場合は後から描いたものが優先
pub fn hit_test(markers: &[Marker], pointer: PointerPos, bbox: &BoundingBox) -> Option<usize> {
    markers
        .iter()
        .rev()
        .find(|m| m.hit(pointer, bbox))
        .map(|m| m.index)
}

/// 詳細ポップアップ（同時に1つだけ）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Popup {
    target: Option<PopupTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupTarget {
    pub index: usize,
    pub record: DamageRecord,
}

impl Popup {
    /// 開いているポップアップは置き換わる
    pub fn open(&mut self, index: usize, record: DamageRecord) {
        self.target = Some(PopupTarget { index, record });
    }

    pub fn close(&mut self) {
        self.target = None;
    }

    pub fn current(&self) -> Option<&PopupTarget> {
        self.target.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }
}

impl PopupTarget {
    /// 📅 日時 / 👤 記録者 / 📝 メモ
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if let Some(timestamp) = &self.record.timestamp {
            lines.push(format!("📅 {}", timestamp));
        }
        if let Some(uploader) = &self.record.uploader {
            lines.push(format!("👤 {}", uploader));
        }
        lines.push(format!("📝 {}", self.record.note));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PLACEHOLDER_PHOTO_URL;

    fn record(x: f64, y: f64, note: &str) -> DamageRecord {
        DamageRecord {
            x,
            y,
            note: note.to_string(),
            photo_url: PLACEHOLDER_PHOTO_URL.to_string(),
            timestamp: Some("2026/01/18 10:00:00".to_string()),
            uploader: Some("テストユーザー".to_string()),
        }
    }

    #[test]
    fn test_markers_follow_records() {
        let records = vec![record(10.0, 20.0, "a"), record(50.0, 50.0, "b")];
        let markers = markers_for(&records, MarkerStyle::Badge);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1].index, 1);
        assert_eq!(markers[0].label, "!");
        assert_eq!(markers[0].tooltip, "2026/01/18 10:00:00 テストユーザー");
        assert_eq!(markers[0].css_position(), "top: 20%; left: 10%;");
    }

    #[test]
    fn test_hit_test_uses_current_size() {
        let markers = markers_for(&[record(25.0, 25.0, "a")], MarkerStyle::Badge);
        let small = BoundingBox::from_size(200.0, 200.0);
        let large = BoundingBox::from_size(400.0, 400.0);

        assert_eq!(hit_test(&markers, PointerPos::new(50.0, 50.0), &small), Some(0));
        assert_eq!(hit_test(&markers, PointerPos::new(50.0, 50.0), &large), None);
        assert_eq!(hit_test(&markers, PointerPos::new(105.0, 95.0), &large), Some(0));
    }

    #[test]
    fn test_hit_test_prefers_last_drawn() {
        let records = vec![record(50.0, 50.0, "under"), record(51.0, 50.0, "over")];
        let markers = markers_for(&records, MarkerStyle::Badge);
        let bbox = BoundingBox::from_size(200.0, 200.0);
        assert_eq!(hit_test(&markers, PointerPos::new(101.0, 100.0), &bbox), Some(1));
    }

    #[test]
    fn test_popup_single_target() {
        let mut popup = Popup::default();
        popup.open(0, record(1.0, 1.0, "first"));
        popup.open(1, record(2.0, 2.0, "second"));
        assert_eq!(popup.current().map(|t| t.index), Some(1));

        popup.close();
        assert!(!popup.is_open());
    }

    #[test]
    fn test_popup_lines() {
        let target = PopupTarget {
            index: 0,
            record: record(1.0, 1.0, "scratch"),
        };
        assert_eq!(
            target.lines(),
            vec!["📅 2026/01/18 10:00:00", "👤 テストユーザー", "📝 scratch"]
        );
    }
}
