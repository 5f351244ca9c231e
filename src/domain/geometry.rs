//! Annular sector geometry and linear interpolation.

use std::f64::consts::TAU;

use serde::Serialize;

/// Full circle in radians.
pub const FULL_TURN: f64 = TAU;

/// Trait for types that support linear interpolation.
///
/// - `t = 0.0` returns `self`
/// - `t = 1.0` returns `other` exactly
pub trait Lerp {
    fn lerp_to(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp_to(&self, other: &Self, t: f64) -> Self {
        // `self + (other - self) * t` can miss `other` by one ulp at t = 1
        if t >= 1.0 {
            *other
        } else {
            self + (other - self) * t
        }
    }
}

/// One annular sector: an angular span and a radial band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub angle_start: f64,
    pub angle_end: f64,
    pub radius_inner: f64,
    pub radius_outer: f64,
}

impl Rect {
    pub fn new(angle_start: f64, angle_end: f64, radius_inner: f64, radius_outer: f64) -> Self {
        Self {
            angle_start,
            angle_end,
            radius_inner,
            radius_outer,
        }
    }

    pub fn angle_span(&self) -> f64 {
        self.angle_end - self.angle_start
    }

    pub fn thickness(&self) -> f64 {
        self.radius_outer - self.radius_inner
    }

    /// Shrink the angular span symmetrically for visual separation.
    ///
    /// At most half the span is removed.
    pub fn padded(&self, pad_angle: f64) -> Self {
        let pad = pad_angle.max(0.0).min(self.angle_span() * 0.5);
        Self {
            angle_start: self.angle_start + pad / 2.0,
            angle_end: self.angle_end - pad / 2.0,
            ..*self
        }
    }
}

impl Lerp for Rect {
    /// Each of the four fields is interpolated independently.
    fn lerp_to(&self, other: &Self, t: f64) -> Self {
        Self {
            angle_start: self.angle_start.lerp_to(&other.angle_start, t),
            angle_end: self.angle_end.lerp_to(&other.angle_end, t),
            radius_inner: self.radius_inner.lerp_to(&other.radius_inner, t),
            radius_outer: self.radius_outer.lerp_to(&other.radius_outer, t),
        }
    }
}

/// Minimum sector size for a text label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRule {
    /// Radians; the span must be strictly greater
    pub min_angle: f64,
    /// Radius units; the thickness must be strictly greater
    pub min_thickness: f64,
}

impl Default for LabelRule {
    fn default() -> Self {
        Self {
            min_angle: 0.03,
            min_thickness: 12.0,
        }
    }
}

impl LabelRule {
    pub fn is_visible(&self, rect: &Rect) -> bool {
        rect.angle_span() > self.min_angle && rect.thickness() > self.min_thickness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_are_exact() {
        let a = Rect::new(0.1, 0.7, 3.0, 9.0);
        let b = Rect::new(1.3, FULL_TURN, 0.0, 40.0 / 3.0);
        assert_eq!(a.lerp_to(&b, 0.0), a);
        assert_eq!(a.lerp_to(&b, 1.0), b);
    }

    #[test]
    fn test_lerp_midpoint_is_componentwise() {
        let a = Rect::new(0.0, 1.0, 0.0, 10.0);
        let b = Rect::new(2.0, 3.0, 10.0, 30.0);
        assert_eq!(a.lerp_to(&b, 0.5), Rect::new(1.0, 2.0, 5.0, 20.0));
    }

    #[test]
    fn test_padded_is_capped_at_half_span() {
        let rect = Rect::new(1.0, 1.01, 0.0, 1.0);
        let padded = rect.padded(1.0);
        assert!((padded.angle_span() - 0.005).abs() < 1e-12);
        assert!(padded.angle_start >= rect.angle_start);
        assert!(padded.angle_end <= rect.angle_end);
    }

    #[test]
    fn test_label_rule_thresholds_are_strict() {
        let rule = LabelRule::default();
        assert!(!rule.is_visible(&Rect::new(0.0, 0.03, 0.0, 50.0)));
        assert!(!rule.is_visible(&Rect::new(0.0, 1.0, 0.0, 12.0)));
        assert!(rule.is_visible(&Rect::new(0.0, 0.031, 0.0, 12.5)));
    }
}
