//! Chrome shared by every panel kind: background, value grid, time grid,
//! axis tick labels, panel title and crosshair.
//!
//! All colors are taken from the live [`Theme`] at build time.

use crate::core::SharedViewport;
use crate::core::geometry::{index_to_x, value_to_y};
use crate::render::frame::{PanelFrame, RectPx};
use crate::render::theme::{Theme, ThemeRole};
use crate::render::{LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};

/// Horizontal grid lines divide the value range into equal steps.
pub const HORIZONTAL_GRID_LINES: usize = 5;
/// Vertical grid stride adapts to zoom: `max(1, floor(100 / candle_width))`.
pub const VERTICAL_GRID_BASE_PX: f64 = 100.0;
pub const AXIS_LABEL_FONT_PX: f64 = 11.0;
pub const PANEL_TITLE_FONT_PX: f64 = 12.0;
pub const GRID_LINE_WIDTH: f64 = 1.0;
pub const CROSSHAIR_LINE_WIDTH: f64 = 1.0;

/// Per-panel Y-axis tick formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelValueFormat {
    Price,
    Oscillator,
    Volume,
}

impl PanelValueFormat {
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Price => format!("{value:.2}"),
            Self::Oscillator => format!("{value:.1}"),
            Self::Volume => format_compact(value),
        }
    }
}

fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

pub fn push_background(frame: &mut PanelFrame, bounds: RectPx, theme: &dyn Theme) {
    frame.push_rect(RectPrimitive::new(
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height,
        theme.color(ThemeRole::Background),
    ));
}

/// Horizontal grid at equal value steps plus right-edge tick labels.
pub fn push_value_grid(
    frame: &mut PanelFrame,
    value_min: f64,
    value_max: f64,
    format: PanelValueFormat,
    theme: &dyn Theme,
) {
    let plot = frame.plot_rect;
    let grid_color = theme.color(ThemeRole::GridLine);
    let label_color = theme.color(ThemeRole::AxisLabel);
    let steps = (HORIZONTAL_GRID_LINES - 1) as f64;

    for step in 0..HORIZONTAL_GRID_LINES {
        let value = value_min + (value_max - value_min) * step as f64 / steps;
        let y = value_to_y(value, value_min, value_max, plot.height, plot.y);
        frame.push_line(LinePrimitive::new(
            plot.x,
            y,
            plot.x + plot.width,
            y,
            GRID_LINE_WIDTH,
            grid_color,
        ));
        frame.push_text(TextPrimitive::new(
            format.format(value),
            plot.x + plot.width - 2.0,
            y - 2.0,
            AXIS_LABEL_FONT_PX,
            label_color,
            TextHAlign::Right,
        ));
    }
}

/// Vertical grid lines at a zoom-adaptive logical-index stride.
pub fn push_time_grid(frame: &mut PanelFrame, viewport: &SharedViewport, theme: &dyn Theme) {
    let Some((start, end)) = viewport.visible_range() else {
        return;
    };
    let plot = frame.plot_rect;
    let candle_width = viewport.candle_width_px();
    let stride = ((VERTICAL_GRID_BASE_PX / candle_width).floor() as usize).max(1);
    let grid_color = theme.color(ThemeRole::GridLine);

    for index in start..=end {
        if index % stride != 0 {
            continue;
        }
        let x = index_to_x(index, start, candle_width, plot.x);
        frame.push_line(LinePrimitive::new(
            x,
            plot.y,
            x,
            plot.y + plot.height,
            GRID_LINE_WIDTH,
            grid_color,
        ));
    }
}

pub fn push_panel_title(frame: &mut PanelFrame, title: &str, theme: &dyn Theme) {
    if title.is_empty() {
        return;
    }
    frame.push_text(TextPrimitive::new(
        title,
        frame.plot_rect.x + 4.0,
        frame.plot_rect.y - 6.0,
        PANEL_TITLE_FONT_PX,
        theme.color(ThemeRole::PanelTitle),
        TextHAlign::Left,
    ));
}

/// Crosshair: the vertical line spans every panel; the horizontal line and
/// its value label appear only in the panel under the pointer.
pub fn push_crosshair(
    frame: &mut PanelFrame,
    snapped_x: f64,
    pointer_y: f64,
    is_origin_panel: bool,
    value_min: f64,
    value_max: f64,
    format: PanelValueFormat,
    theme: &dyn Theme,
) {
    let plot = frame.plot_rect;
    let line_color = theme.color(ThemeRole::CrosshairLine);

    if snapped_x >= plot.x && snapped_x <= plot.x + plot.width {
        frame.push_line(LinePrimitive::new(
            snapped_x,
            plot.y,
            snapped_x,
            plot.y + plot.height,
            CROSSHAIR_LINE_WIDTH,
            line_color,
        ));
    }

    if !is_origin_panel || pointer_y < plot.y || pointer_y > plot.y + plot.height {
        return;
    }

    frame.push_line(LinePrimitive::new(
        plot.x,
        pointer_y,
        plot.x + plot.width,
        pointer_y,
        CROSSHAIR_LINE_WIDTH,
        line_color,
    ));

    let span = value_max - value_min;
    if span > 0.0 && span.is_finite() && plot.height > 0.0 {
        let value = value_max - (pointer_y - plot.y) / plot.height * span;
        frame.push_text(TextPrimitive::new(
            format.format(value),
            plot.x + plot.width - 2.0,
            pointer_y - 3.0,
            AXIS_LABEL_FONT_PX,
            theme.color(ThemeRole::CrosshairLabel),
            TextHAlign::Right,
        ));
    }
}
