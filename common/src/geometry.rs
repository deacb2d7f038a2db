//! クリック位置 → 図上の割合座標
//!
//! 図の矩形はクリックごとに読み直す前提。クランプはしない。

use crate::error::ValidationError;

/// ポインタ位置（ビューポート座標, px）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPos {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerPos {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// 図の表示矩形（ビューポート座標, px）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// 原点(0,0)の矩形
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn contains(&self, pointer: PointerPos) -> bool {
        pointer.client_x >= self.left
            && pointer.client_x <= self.left + self.width
            && pointer.client_y >= self.top
            && pointer.client_y <= self.top + self.height
    }

    /// (x%, y%) = (client - 矩形左上) / 矩形サイズ * 100
    pub fn to_percent(&self, pointer: PointerPos) -> Result<(f64, f64), ValidationError> {
        if !is_usable_extent(self.width) || !is_usable_extent(self.height) {
            return Err(ValidationError::EmptyBoundingBox {
                width: self.width,
                height: self.height,
            });
        }
        let x = (pointer.client_x - self.left) / self.width * 100.0;
        let y = (pointer.client_y - self.top) / self.height * 100.0;
        // 非有限値はJSONで null になり台帳全体が読めなくなる
        if !x.is_finite() || !y.is_finite() {
            return Err(ValidationError::NonFinitePointer {
                x: pointer.client_x,
                y: pointer.client_y,
            });
        }
        Ok((x, y))
    }

    /// 割合座標 → 現在の表示サイズでの位置
    pub fn from_percent(&self, x_pct: f64, y_pct: f64) -> PointerPos {
        PointerPos::new(
            self.left + self.width * x_pct / 100.0,
            self.top + self.height * y_pct / 100.0,
        )
    }
}

fn is_usable_extent(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_percent_center_of_200_box() {
        let bbox = BoundingBox::from_size(200.0, 200.0);
        let (x, y) = bbox.to_percent(PointerPos::new(50.0, 50.0)).unwrap();
        assert_eq!(x, 25.0);
        assert_eq!(y, 25.0);
    }

    #[test]
    fn test_to_percent_with_offset() {
        let bbox = BoundingBox::new(100.0, 40.0, 400.0, 200.0);
        let (x, y) = bbox.to_percent(PointerPos::new(300.0, 140.0)).unwrap();
        assert_eq!(x, 50.0);
        assert_eq!(y, 50.0);
    }

    #[test]
    fn test_edges_yield_0_and_100() {
        let bbox = BoundingBox::new(10.0, 20.0, 300.0, 150.0);
        assert_eq!(bbox.to_percent(PointerPos::new(10.0, 20.0)).unwrap(), (0.0, 0.0));
        assert_eq!(bbox.to_percent(PointerPos::new(310.0, 170.0)).unwrap(), (100.0, 100.0));
    }

    #[test]
    fn test_inside_box_stays_in_range_and_monotonic() {
        let bbox = BoundingBox::new(7.0, 3.0, 333.0, 111.0);
        let mut last = (-1.0, -1.0);
        for step in 0..=100 {
            let t = step as f64 / 100.0;
            let pointer = PointerPos::new(bbox.left + bbox.width * t, bbox.top + bbox.height * t);
            assert!(bbox.contains(pointer));
            let (x, y) = bbox.to_percent(pointer).unwrap();
            assert!((0.0..=100.0).contains(&x), "x out of range: {}", x);
            assert!((0.0..=100.0).contains(&y), "y out of range: {}", y);
            assert!(x >= last.0 && y >= last.1);
            last = (x, y);
        }
    }

    #[test]
    fn test_outside_box_is_not_clamped() {
        let bbox = BoundingBox::from_size(100.0, 100.0);
        let (x, y) = bbox.to_percent(PointerPos::new(-10.0, 120.0)).unwrap();
        assert_eq!(x, -10.0);
        assert_eq!(y, 120.0);
    }

    #[test]
    fn test_zero_sized_box_is_rejected() {
        let bbox = BoundingBox::from_size(0.0, 100.0);
        let err = bbox.to_percent(PointerPos::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyBoundingBox { .. }));
        assert!(BoundingBox::from_size(10.0, f64::NAN).to_percent(PointerPos::default()).is_err());
    }

    #[test]
    fn test_non_finite_pointer_is_rejected() {
        let bbox = BoundingBox::from_size(200.0, 200.0);
        for pointer in [
            PointerPos::new(f64::INFINITY, 50.0),
            PointerPos::new(50.0, f64::NEG_INFINITY),
            PointerPos::new(f64::NAN, 50.0),
        ] {
            let err = bbox.to_percent(pointer).unwrap_err();
            assert!(matches!(err, ValidationError::NonFinitePointer { .. }));
        }
    }

    #[test]
    fn test_overflowing_quotient_is_rejected() {
        // 有限値同士でも割り算で inf になる
        let bbox = BoundingBox::new(-f64::MAX, 0.0, f64::MIN_POSITIVE, 100.0);
        let err = bbox.to_percent(PointerPos::new(f64::MAX, 50.0)).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinitePointer { .. }));
    }

    #[test]
    fn test_from_percent_tracks_resize() {
        let small = BoundingBox::from_size(200.0, 100.0);
        let large = BoundingBox::from_size(400.0, 200.0);
        assert_eq!(small.from_percent(25.0, 50.0), PointerPos::new(50.0, 50.0));
        assert_eq!(large.from_percent(25.0, 50.0), PointerPos::new(100.0, 100.0));
    }
}
