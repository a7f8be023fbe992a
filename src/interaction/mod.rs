//! Pointer state machine: `idle -> dragging -> idle`, with wheel/pinch zoom
//! allowed from either state.
//!
//! This module owns pointer bookkeeping only; the engine is the single
//! writer that translates the reported gestures into viewport mutations.

use serde::{Deserialize, Serialize};

use crate::core::Trade;

/// Keyboard pan step in pixels per arrow press.
pub const KEY_PAN_STEP_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging,
}

/// Keyboard commands understood by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    ZoomIn,
    ZoomOut,
    Reset,
    PanLeft,
    PanRight,
}

impl KeyCommand {
    /// Maps a host key name to a command (`+`/`=` zoom in, `-` zoom out,
    /// `0` reset, arrows pan).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "+" | "=" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            "0" => Some(Self::Reset),
            "ArrowLeft" => Some(Self::PanLeft),
            "ArrowRight" => Some(Self::PanRight),
            _ => None,
        }
    }
}

/// Snapped pointer position reported to every consumer.
///
/// `x` is the candle-slot center, not the raw pointer x; `y` is local to the
/// origin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
    pub origin_panel_id: String,
}

/// Public pointer state owned by the chart instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PointerState {
    pub position: Option<PointerPosition>,
    pub dragging: bool,
    pub hovered_trade: Option<Trade>,
    /// Absolute logical index under the pointer, kept so a zoom can re-locate
    /// the same candle and re-emit its new center.
    pub snapped_index: Option<usize>,
}

/// Interaction bookkeeping: mode, drag origin and pinch baseline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    pointer: PointerState,
    last_drag_x: f64,
    pinch_distance: Option<f64>,
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.pointer.dragging
    }

    pub fn on_pointer_down(&mut self, x: f64) {
        self.mode = InteractionMode::Dragging;
        self.pointer.dragging = true;
        self.last_drag_x = x;
    }

    /// Advances the drag and returns the raw pixel delta to pan by (1:1).
    ///
    /// Returns `None` while idle.
    pub fn on_drag_move(&mut self, x: f64) -> Option<f64> {
        if !self.pointer.dragging {
            return None;
        }
        let delta = x - self.last_drag_x;
        self.last_drag_x = x;
        Some(delta)
    }

    pub fn on_pointer_up(&mut self) {
        self.mode = InteractionMode::Idle;
        self.pointer.dragging = false;
    }

    /// Pointer left the composite chart area: end any drag and clear state.
    pub fn on_pointer_leave(&mut self) {
        self.mode = InteractionMode::Idle;
        self.pointer.dragging = false;
        self.pointer.position = None;
        self.pointer.hovered_trade = None;
        self.pointer.snapped_index = None;
    }

    pub fn set_snapped_position(
        &mut self,
        x: f64,
        y: f64,
        origin_panel_id: impl Into<String>,
        snapped_index: usize,
    ) {
        self.pointer.position = Some(PointerPosition {
            x,
            y,
            origin_panel_id: origin_panel_id.into(),
        });
        self.pointer.snapped_index = Some(snapped_index);
    }

    pub fn clear_position(&mut self) {
        self.pointer.position = None;
        self.pointer.snapped_index = None;
    }

    /// Updates the hovered trade; returns `true` when it changed.
    pub fn set_hovered_trade(&mut self, trade: Option<Trade>) -> bool {
        if self.pointer.hovered_trade == trade {
            return false;
        }
        self.pointer.hovered_trade = trade;
        true
    }

    pub fn on_pinch_start(&mut self, distance: f64) {
        if distance.is_finite() && distance > 0.0 {
            self.pinch_distance = Some(distance);
        }
    }

    /// Advances a pinch and returns the zoom factor (`new / old` distance).
    ///
    /// Returns `None` until a pinch baseline exists.
    pub fn on_pinch_move(&mut self, distance: f64) -> Option<f64> {
        if !distance.is_finite() || distance <= 0.0 {
            return None;
        }
        let baseline = self.pinch_distance?;
        self.pinch_distance = Some(distance);
        Some(distance / baseline)
    }

    pub fn on_pinch_end(&mut self) {
        self.pinch_distance = None;
    }
}
