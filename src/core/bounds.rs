use serde::Serialize;

use crate::config::SimConfig;

/// Axis-aligned container box.
///
/// The xy face is a square anchored at `(left, top)` with y growing downward
/// (host screen convention). Depth is symmetric: `z ∈ [-width/2, width/2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Container for a gas of `volume`: side scales with `sqrt(volume / reference)`.
    pub fn for_volume(cfg: &SimConfig, volume: f64) -> Self {
        let side = cfg.base_side * (volume / cfg.reference_volume).max(0.0).sqrt();
        Self::new(cfg.origin[0], cfg.origin[1], side, side)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[inline]
    pub fn center_y(&self) -> f64 {
        self.top + 0.5 * self.height
    }

    /// Half of the depth extent; the box is as deep as it is wide.
    #[inline]
    pub fn half_depth(&self) -> f64 {
        0.5 * self.width
    }

    /// `[lo, hi]` on `axis` (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis_range(&self, axis: usize) -> (f64, f64) {
        match axis {
            0 => (self.left, self.right()),
            1 => (self.top, self.bottom()),
            _ => (-self.half_depth(), self.half_depth()),
        }
    }

    /// Inlet port: middle of the left wall.
    #[inline]
    pub fn inlet(&self) -> [f64; 2] {
        [self.left, self.center_y()]
    }

    /// Outlet port: middle of the right wall.
    #[inline]
    pub fn outlet(&self) -> [f64; 2] {
        [self.right(), self.center_y()]
    }
}
