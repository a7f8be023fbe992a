//! Shared horizontal viewport: the single source of truth for zoom, pan and
//! the visible candle window that every panel reads.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ChartError, ChartResult};

/// Candle slots never collapse below this pixel width, regardless of zoom.
pub const MIN_CANDLE_WIDTH_PX: f64 = 2.0;
pub const ZOOM_FACTOR_MIN: f64 = 0.1;
pub const ZOOM_FACTOR_MAX: f64 = 10.0;
/// Multiplicative step applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;
/// Multiplicative steps applied per keyboard zoom command (+/- 20%).
pub const KEY_ZOOM_IN_FACTOR: f64 = 1.2;
pub const KEY_ZOOM_OUT_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Maps a wheel delta to a zoom direction (`delta_y < 0` zooms in).
    #[must_use]
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 { Self::In } else { Self::Out }
    }

    #[must_use]
    const fn wheel_factor(self) -> f64 {
        match self {
            Self::In => WHEEL_ZOOM_STEP,
            Self::Out => 0.9,
        }
    }
}

/// Shared horizontal viewport over an ascending candle array.
///
/// Invariants, re-established after every mutation:
/// - `candle_width_px = max(2, base_candle_width_px * zoom_factor)`
/// - `start_index = max(0, floor(-pan_offset_px / candle_width_px))`
/// - `end_index = min(total_candles - 1, start_index + visible_count - 1)`
/// - `pan_offset_px` is clamped to `[-(total - visible) * width, 0]` when the
///   data is wider than the container, and forced to `0` otherwise (sparse
///   data stays left-aligned, trailing space is allowed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharedViewport {
    container_width_px: f64,
    base_candle_width_px: f64,
    padding_left_px: f64,
    zoom_factor: f64,
    pan_offset_px: f64,
    total_candles: usize,
    start_index: usize,
    end_index: usize,
}

impl SharedViewport {
    pub fn new(
        container_width_px: f64,
        base_candle_width_px: f64,
        padding_left_px: f64,
    ) -> ChartResult<Self> {
        if !container_width_px.is_finite() || container_width_px < 0.0 {
            return Err(ChartError::InvalidContainer {
                width_px: container_width_px,
            });
        }
        if !base_candle_width_px.is_finite() || base_candle_width_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "base candle width must be finite and > 0".to_owned(),
            ));
        }
        if !padding_left_px.is_finite() || padding_left_px < 0.0 {
            return Err(ChartError::InvalidData(
                "left padding must be finite and >= 0".to_owned(),
            ));
        }

        let mut viewport = Self {
            container_width_px,
            base_candle_width_px,
            padding_left_px,
            zoom_factor: 1.0,
            pan_offset_px: 0.0,
            total_candles: 0,
            start_index: 0,
            end_index: 0,
        };
        viewport.recompute();
        Ok(viewport)
    }

    #[must_use]
    pub fn candle_width_px(self) -> f64 {
        (self.base_candle_width_px * self.zoom_factor).max(MIN_CANDLE_WIDTH_PX)
    }

    #[must_use]
    pub fn zoom_factor(self) -> f64 {
        self.zoom_factor
    }

    #[must_use]
    pub fn pan_offset_px(self) -> f64 {
        self.pan_offset_px
    }

    #[must_use]
    pub fn container_width_px(self) -> f64 {
        self.container_width_px
    }

    #[must_use]
    pub fn padding_left_px(self) -> f64 {
        self.padding_left_px
    }

    #[must_use]
    pub fn total_candles(self) -> usize {
        self.total_candles
    }

    /// Number of whole candle slots that fit in the container.
    #[must_use]
    pub fn visible_count(self) -> usize {
        if self.container_width_px <= 0.0 {
            return 0;
        }
        (self.container_width_px / self.candle_width_px()).floor() as usize
    }

    /// Inclusive visible index window, or `None` when nothing can be shown.
    #[must_use]
    pub fn visible_range(self) -> Option<(usize, usize)> {
        if self.is_degenerate() {
            return None;
        }
        Some((self.start_index, self.end_index))
    }

    #[must_use]
    pub fn start_index(self) -> usize {
        self.start_index
    }

    #[must_use]
    pub fn end_index(self) -> usize {
        self.end_index
    }

    /// True when there is no data or no room to draw it.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.total_candles == 0 || self.visible_count() == 0
    }

    /// Updates the candle count, keeping the current pan clamped into the new
    /// data extent.
    pub fn set_total_candles(&mut self, total_candles: usize) {
        self.total_candles = total_candles;
        self.recompute();
    }

    /// Scrolls so the most recent candles fill the right edge.
    pub fn scroll_to_latest(&mut self) {
        self.pan_offset_px = f64::NEG_INFINITY;
        self.recompute();
    }

    /// Focal-point zoom: the fractional candle position under `anchor_x`
    /// stays at `anchor_x` after the transform (until the pan clamp wins).
    pub fn zoom(&mut self, direction: ZoomDirection, anchor_x: f64) -> ChartResult<bool> {
        self.zoom_by_factor(direction.wheel_factor(), anchor_x)
    }

    /// General multiplicative zoom used by wheel, pinch and keyboard paths.
    pub fn zoom_by_factor(&mut self, factor: f64, anchor_x: f64) -> ChartResult<bool> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ChartError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        if !anchor_x.is_finite() {
            return Err(ChartError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }
        if self.is_degenerate() {
            return Ok(false);
        }

        let before = *self;
        let old_width = self.candle_width_px();
        // Fractional logical position under the cursor, deliberately unrounded.
        let anchor_slot = (anchor_x - self.padding_left_px - self.pan_offset_px) / old_width;

        self.zoom_factor = (self.zoom_factor * factor).clamp(ZOOM_FACTOR_MIN, ZOOM_FACTOR_MAX);
        let new_width = self.candle_width_px();
        self.pan_offset_px = anchor_x - self.padding_left_px - anchor_slot * new_width;
        self.recompute();

        trace!(
            zoom = self.zoom_factor,
            candle_width = new_width,
            start = self.start_index,
            end = self.end_index,
            "viewport zoom"
        );
        Ok(*self != before)
    }

    /// Translates the viewport by raw pixels (1:1 with pointer movement).
    pub fn pan(&mut self, delta_px: f64) -> ChartResult<bool> {
        if !delta_px.is_finite() {
            return Err(ChartError::InvalidData(
                "pan delta must be finite".to_owned(),
            ));
        }
        if self.is_degenerate() {
            return Ok(false);
        }
        let before = *self;
        self.pan_offset_px += delta_px;
        self.recompute();
        Ok(*self != before)
    }

    /// Restores zoom 1.0 and scrolls to the most recent data.
    pub fn reset(&mut self) {
        self.zoom_factor = 1.0;
        self.scroll_to_latest();
    }

    /// Applies a new container width, re-clamping pan and the index window.
    pub fn resize_container(&mut self, width_px: f64) -> ChartResult<()> {
        if !width_px.is_finite() || width_px < 0.0 {
            return Err(ChartError::InvalidContainer { width_px });
        }
        self.container_width_px = width_px;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        let width = self.candle_width_px();
        let visible = self.visible_count();

        if self.total_candles > visible && visible > 0 {
            let min_offset = -((self.total_candles - visible) as f64) * width;
            self.pan_offset_px = self.pan_offset_px.clamp(min_offset, 0.0);
        } else {
            // Sparse data keeps its left alignment; see module invariants.
            self.pan_offset_px = 0.0;
        }

        if self.total_candles == 0 || visible == 0 {
            self.start_index = 0;
            self.end_index = 0;
            return;
        }

        self.start_index = ((-self.pan_offset_px / width).floor()).max(0.0) as usize;
        self.end_index = (self.start_index + visible - 1).min(self.total_candles - 1);
    }
}
