//! Per-panel scene builders.
//!
//! One builder per panel kind (price, oscillator, volume) dispatched over the
//! descriptor's tag; all share the chrome module and the geometry mapping so
//! every surface stays in pixel agreement with the shared viewport.

use serde::{Deserialize, Serialize};

use crate::core::geometry::{index_to_x, overscan_range, value_to_y};
use crate::core::routing::{PanelDescriptor, PanelKind, YAxisPolicy};
use crate::core::types::{Candle, IndicatorKind, IndicatorSeries};
use crate::core::{PanelRegion, SharedViewport};
use crate::render::chrome::{
    self, PanelValueFormat, push_background, push_crosshair, push_panel_title, push_time_grid,
    push_value_grid,
};
use crate::render::frame::{PanelFrame, RectPx};
use crate::render::theme::{Theme, ThemeRole};
use crate::render::{LinePrimitive, RectPrimitive};

/// Wick spans 10% of the candle slot, the body 80% (never below 2 px).
pub const WICK_WIDTH_RATIO: f64 = 0.1;
pub const BODY_WIDTH_RATIO: f64 = 0.8;
pub const MIN_BODY_WIDTH_PX: f64 = 2.0;
/// Price range padding above/below the visible envelope.
pub const PRICE_RANGE_PAD_RATIO: f64 = 0.05;
/// Auto-ranged oscillator padding.
pub const OSCILLATOR_RANGE_PAD_RATIO: f64 = 0.10;
/// Volume bars leave headroom so moving averages never clip.
pub const VOLUME_HEADROOM: f64 = 1.1;
pub const VOLUME_BAR_ALPHA: f64 = 0.6;
pub const INDICATOR_LINE_WIDTH: f64 = 1.5;
pub const HISTOGRAM_BAR_WIDTH_RATIO: f64 = 0.6;
/// Static reference levels drawn on an RSI-identified panel.
pub const RSI_REFERENCE_LEVELS: [f64; 3] = [30.0, 50.0, 70.0];

/// Pointer context threaded into scene building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrosshairView<'a> {
    pub snapped_x: f64,
    pub origin_panel_id: &'a str,
    /// Pointer Y in the origin panel's local coordinates.
    pub pointer_y: f64,
}

/// Read-only inputs shared by every panel builder.
pub struct PanelSceneInputs<'a> {
    pub viewport: &'a SharedViewport,
    pub candles: &'a [Candle],
    pub theme: &'a dyn Theme,
    pub crosshair: Option<CrosshairView<'a>>,
}

/// Projected candle geometry in panel-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub center_x: f64,
    pub body_left: f64,
    pub body_right: f64,
    pub body_top: f64,
    pub body_bottom: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub is_bullish: bool,
}

/// Projects one candle into deterministic render geometry.
///
/// Pure so rendering and regression tests consume identical output.
#[must_use]
pub fn project_candle(
    candle: Candle,
    index: usize,
    start_index: usize,
    candle_width_px: f64,
    plot: RectPx,
    value_min: f64,
    value_max: f64,
) -> CandleGeometry {
    let center_x = index_to_x(index, start_index, candle_width_px, plot.x);
    let body_half = (candle_width_px * BODY_WIDTH_RATIO).max(MIN_BODY_WIDTH_PX) / 2.0;
    let open_y = value_to_y(candle.open, value_min, value_max, plot.height, plot.y);
    let close_y = value_to_y(candle.close, value_min, value_max, plot.height, plot.y);

    CandleGeometry {
        center_x,
        body_left: center_x - body_half,
        body_right: center_x + body_half,
        body_top: open_y.min(close_y),
        body_bottom: open_y.max(close_y),
        wick_top: value_to_y(candle.high, value_min, value_max, plot.height, plot.y),
        wick_bottom: value_to_y(candle.low, value_min, value_max, plot.height, plot.y),
        is_bullish: candle.is_bullish(),
    }
}

fn visible_series<'a>(
    panel: &'a PanelDescriptor,
) -> impl Iterator<Item = &'a IndicatorSeries> {
    panel.indicators.iter().filter(|series| series.visible)
}

fn series_minmax_in_window(
    series: &IndicatorSeries,
    window: (usize, usize),
    min: &mut f64,
    max: &mut f64,
) {
    for point in &series.points {
        if point.index < window.0 || point.index > window.1 || !point.value.is_finite() {
            continue;
        }
        *min = min.min(point.value);
        *max = max.max(point.value);
    }
}

/// Price-panel Y range: candle high/low envelope plus visible overlay values
/// in the window, padded 5%. `None` when the window holds nothing finite.
#[must_use]
pub fn price_value_range(
    candles: &[Candle],
    panel: &PanelDescriptor,
    window: (usize, usize),
) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for index in window.0..=window.1.min(candles.len().saturating_sub(1)) {
        let candle = candles.get(index)?;
        min = min.min(candle.low);
        max = max.max(candle.high);
    }
    for series in visible_series(panel) {
        series_minmax_in_window(series, window, &mut min, &mut max);
    }

    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let pad = (max - min) * PRICE_RANGE_PAD_RATIO;
    Some((min - pad, max + pad))
}

/// Oscillator Y range: the routed fixed range, or the visible value envelope
/// padded 10% when the policy is `Auto`.
#[must_use]
pub fn oscillator_value_range(panel: &PanelDescriptor, window: (usize, usize)) -> (f64, f64) {
    if let YAxisPolicy::Fixed { min, max } = panel.y_axis_policy {
        return (min, max);
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for series in visible_series(panel) {
        series_minmax_in_window(series, window, &mut min, &mut max);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = (max - min) * OSCILLATOR_RANGE_PAD_RATIO;
    (min - pad, max + pad)
}

/// Volume scale ceiling: 1.1 x the largest visible volume, where "volume"
/// includes any volume-derived moving-average samples so those lines never
/// clip.
#[must_use]
pub fn volume_panel_max(
    candles: &[Candle],
    panel: &PanelDescriptor,
    window: (usize, usize),
) -> f64 {
    let mut max = 0.0f64;
    for index in window.0..=window.1.min(candles.len().saturating_sub(1)) {
        if let Some(volume) = candles.get(index).and_then(|candle| candle.volume) {
            if volume.is_finite() {
                max = max.max(volume);
            }
        }
    }
    for series in visible_series(panel) {
        let mut series_min = f64::INFINITY;
        let mut series_max = f64::NEG_INFINITY;
        series_minmax_in_window(series, window, &mut series_min, &mut series_max);
        if series_max.is_finite() {
            max = max.max(series_max);
        }
    }
    max * VOLUME_HEADROOM
}

/// Builds the scene for one panel, dispatching on its kind.
#[must_use]
pub fn build_panel_frame(
    panel: &PanelDescriptor,
    region: &PanelRegion,
    header_height_px: f64,
    inputs: &PanelSceneInputs<'_>,
) -> PanelFrame {
    let viewport = inputs.viewport;
    let plot = RectPx::new(
        viewport.padding_left_px(),
        header_height_px,
        viewport.container_width_px(),
        region.plot_height_px(),
    );
    let bounds = RectPx::new(
        0.0,
        0.0,
        viewport.padding_left_px() + viewport.container_width_px(),
        header_height_px + region.plot_height_px(),
    );
    let mut frame = PanelFrame::new(panel.id.clone(), plot);

    push_background(&mut frame, bounds, inputs.theme);

    let Some(window) = viewport.visible_range() else {
        return frame;
    };

    let (value_min, value_max, format) = match panel.kind {
        PanelKind::Price => {
            let (min, max) = price_value_range(inputs.candles, panel, window)
                .unwrap_or((0.0, 1.0));
            (min, max, PanelValueFormat::Price)
        }
        PanelKind::Oscillator => {
            let (min, max) = oscillator_value_range(panel, window);
            (min, max, PanelValueFormat::Oscillator)
        }
        PanelKind::Volume => {
            let max = volume_panel_max(inputs.candles, panel, window);
            (0.0, if max > 0.0 { max } else { 1.0 }, PanelValueFormat::Volume)
        }
    };

    push_value_grid(&mut frame, value_min, value_max, format, inputs.theme);
    push_time_grid(&mut frame, viewport, inputs.theme);
    push_panel_title(&mut frame, &panel.title, inputs.theme);

    match panel.kind {
        PanelKind::Price => {
            push_candles(&mut frame, inputs, window, value_min, value_max);
            push_indicator_lines(&mut frame, panel, viewport, window, value_min, value_max);
        }
        PanelKind::Oscillator => {
            if panel.id == "rsi" {
                push_reference_lines(&mut frame, value_min, value_max, inputs.theme);
            }
            push_indicator_histograms(&mut frame, panel, viewport, window, value_min, value_max);
            push_indicator_lines(&mut frame, panel, viewport, window, value_min, value_max);
        }
        PanelKind::Volume => {
            push_volume_bars(&mut frame, inputs, window, value_max);
            push_indicator_lines(&mut frame, panel, viewport, window, value_min, value_max);
        }
    }

    if let Some(crosshair) = inputs.crosshair {
        push_crosshair(
            &mut frame,
            crosshair.snapped_x,
            crosshair.pointer_y,
            crosshair.origin_panel_id == panel.id,
            value_min,
            value_max,
            format,
            inputs.theme,
        );
    }

    frame
}

fn push_candles(
    frame: &mut PanelFrame,
    inputs: &PanelSceneInputs<'_>,
    window: (usize, usize),
    value_min: f64,
    value_max: f64,
) {
    let viewport = inputs.viewport;
    let Some((draw_start, draw_end)) =
        overscan_range(window.0, window.1, inputs.candles.len())
    else {
        return;
    };

    let candle_width = viewport.candle_width_px();
    let wick_width = (candle_width * WICK_WIDTH_RATIO).max(1.0);
    let up = inputs.theme.color(ThemeRole::CandleUp);
    let down = inputs.theme.color(ThemeRole::CandleDown);
    let plot = frame.plot_rect;

    for index in draw_start..=draw_end {
        let Some(&candle) = inputs.candles.get(index) else {
            continue;
        };
        let geometry = project_candle(
            candle,
            index,
            window.0,
            candle_width,
            plot,
            value_min,
            value_max,
        );
        let color = if geometry.is_bullish { up } else { down };

        frame.push_line(LinePrimitive::new(
            geometry.center_x,
            geometry.wick_top,
            geometry.center_x,
            geometry.wick_bottom,
            wick_width,
            color,
        ));
        frame.push_rect(RectPrimitive::new(
            geometry.body_left,
            geometry.body_top,
            geometry.body_right - geometry.body_left,
            (geometry.body_bottom - geometry.body_top).max(1.0),
            color,
        ));
    }
}

/// Polylines for visible line/area series, broken at non-finite samples.
fn push_indicator_lines(
    frame: &mut PanelFrame,
    panel: &PanelDescriptor,
    viewport: &SharedViewport,
    window: (usize, usize),
    value_min: f64,
    value_max: f64,
) {
    let candle_width = viewport.candle_width_px();
    let plot = frame.plot_rect;
    let draw_start = window.0.saturating_sub(crate::core::geometry::OVERSCAN_INDICES);
    let draw_end = window.1.saturating_add(crate::core::geometry::OVERSCAN_INDICES);

    for series in visible_series(panel) {
        if series.kind == IndicatorKind::Histogram {
            continue;
        }
        let mut previous: Option<(f64, f64)> = None;
        for point in &series.points {
            if point.index < draw_start || point.index > draw_end {
                continue;
            }
            if !point.value.is_finite() {
                previous = None;
                continue;
            }
            let x = index_to_x(point.index, window.0, candle_width, plot.x);
            let y = value_to_y(point.value, value_min, value_max, plot.height, plot.y);
            if let Some((prev_x, prev_y)) = previous {
                frame.push_line(LinePrimitive::new(
                    prev_x,
                    prev_y,
                    x,
                    y,
                    INDICATOR_LINE_WIDTH,
                    series.color,
                ));
            }
            previous = Some((x, y));
        }
    }
}

/// Zero-baselined bars for histogram series (e.g. the MACD histogram).
fn push_indicator_histograms(
    frame: &mut PanelFrame,
    panel: &PanelDescriptor,
    viewport: &SharedViewport,
    window: (usize, usize),
    value_min: f64,
    value_max: f64,
) {
    let candle_width = viewport.candle_width_px();
    let bar_half = (candle_width * HISTOGRAM_BAR_WIDTH_RATIO) / 2.0;
    let plot = frame.plot_rect;
    let baseline = value_to_y(
        0.0f64.clamp(value_min, value_max),
        value_min,
        value_max,
        plot.height,
        plot.y,
    );

    for series in visible_series(panel) {
        if series.kind != IndicatorKind::Histogram {
            continue;
        }
        for point in &series.points {
            if point.index < window.0 || point.index > window.1 || !point.value.is_finite() {
                continue;
            }
            let x = index_to_x(point.index, window.0, candle_width, plot.x);
            let y = value_to_y(point.value, value_min, value_max, plot.height, plot.y);
            frame.push_rect(RectPrimitive::new(
                x - bar_half,
                y.min(baseline),
                bar_half * 2.0,
                (y - baseline).abs().max(1.0),
                series.color,
            ));
        }
    }
}

fn push_reference_lines(
    frame: &mut PanelFrame,
    value_min: f64,
    value_max: f64,
    theme: &dyn Theme,
) {
    let plot = frame.plot_rect;
    let color = theme.color(ThemeRole::ReferenceLine);
    for level in RSI_REFERENCE_LEVELS {
        let y = value_to_y(level, value_min, value_max, plot.height, plot.y);
        frame.push_line(LinePrimitive::new(
            plot.x,
            y,
            plot.x + plot.width,
            y,
            chrome::GRID_LINE_WIDTH,
            color,
        ));
    }
}

/// Volume bars colored by the candle up/down rule at 60% opacity.
fn push_volume_bars(
    frame: &mut PanelFrame,
    inputs: &PanelSceneInputs<'_>,
    window: (usize, usize),
    panel_max: f64,
) {
    if panel_max <= 0.0 {
        return;
    }
    let viewport = inputs.viewport;
    let candle_width = viewport.candle_width_px();
    let bar_half = (candle_width * BODY_WIDTH_RATIO).max(MIN_BODY_WIDTH_PX) / 2.0;
    let plot = frame.plot_rect;
    let up = inputs.theme.color(ThemeRole::CandleUp).with_alpha(VOLUME_BAR_ALPHA);
    let down = inputs
        .theme
        .color(ThemeRole::CandleDown)
        .with_alpha(VOLUME_BAR_ALPHA);

    for index in window.0..=window.1.min(inputs.candles.len().saturating_sub(1)) {
        let Some(&candle) = inputs.candles.get(index) else {
            continue;
        };
        let Some(volume) = candle.volume.filter(|volume| volume.is_finite()) else {
            continue;
        };
        let height = (volume / panel_max) * plot.height;
        let x = index_to_x(index, window.0, candle_width, plot.x);
        frame.push_rect(RectPrimitive::new(
            x - bar_half,
            plot.y + plot.height - height,
            bar_half * 2.0,
            height,
            if candle.is_bullish() { up } else { down },
        ));
    }
}
