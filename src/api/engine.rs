use indexmap::IndexMap;
use tracing::debug;

use crate::core::geometry::{index_to_x, snap_index_at_x};
use crate::core::routing::{
    PRICE_PANEL_ID, build_panels, toggle_indicator_group, visibility_map,
};
use crate::core::viewport::{KEY_ZOOM_IN_FACTOR, KEY_ZOOM_OUT_FACTOR};
use crate::core::{
    Candle, ChartLayout, IndicatorSeries, PanelDescriptor, PanelKind, PanelRegion,
    SharedViewport, Trade, TradeSide, ZoomDirection, compute_layout,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::trades::{self, place_trade_markers};
use crate::interaction::{InteractionState, KEY_PAN_STEP_PX, KeyCommand, PointerState};
use crate::render::{
    ChartScene, CrosshairView, DarkTheme, PanelFrame, PanelSceneInputs, RectPrimitive, RectPx,
    Renderer, Theme, ThemeRole, build_panel_frame, price_value_range,
};

use super::ChartEngineConfig;
use super::invalidation::{RedrawGate, ResizeThrottle};
use super::snapshot::EngineSnapshot;

/// Invoked with the full indicator-visibility map after any toggle.
pub type VisibilityCallback = Box<dyn FnMut(&IndexMap<String, bool>)>;
/// Invoked whenever the hovered trade changes (including back to none).
pub type HoveredTradeCallback = Box<dyn FnMut(Option<&Trade>)>;

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the shared viewport, pointer state, panel set and
/// renderer. It is the single writer of viewport/pointer state; panels and
/// scene builders only read.
pub struct ChartEngine<R: Renderer> {
    renderer: R,
    config: ChartEngineConfig,
    viewport: SharedViewport,
    interaction: InteractionState,
    candles: Vec<Candle>,
    trades: Vec<Trade>,
    panels: Vec<PanelDescriptor>,
    theme: Box<dyn Theme>,
    gate: RedrawGate,
    resize_throttle: ResizeThrottle,
    on_visibility_change: Option<VisibilityCallback>,
    on_hovered_trade_change: Option<HoveredTradeCallback>,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        let viewport = SharedViewport::new(
            config.container_width_px,
            config.base_candle_width_px,
            config.padding_left_px,
        )?;

        let mut gate = RedrawGate::default();
        gate.mark_dirty();

        Ok(Self {
            renderer,
            config,
            viewport,
            interaction: InteractionState::default(),
            candles: Vec::new(),
            trades: Vec::new(),
            panels: build_panels(&[], &[]),
            theme: Box::new(DarkTheme),
            gate,
            resize_throttle: ResizeThrottle::new(config.resize_min_interval_seconds),
            on_visibility_change: None,
            on_hovered_trade_change: None,
        })
    }

    // ----- accessors -------------------------------------------------------

    #[must_use]
    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    #[must_use]
    pub fn pointer_state(&self) -> &PointerState {
        self.interaction.pointer()
    }

    #[must_use]
    pub fn panels(&self) -> &[PanelDescriptor] {
        &self.panels
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    #[must_use]
    pub fn visibility_map(&self) -> IndexMap<String, bool> {
        visibility_map(&self.panels)
    }

    /// Candle under the (snapped) pointer, or `None` when the pointer is
    /// outside the chart or the stored index no longer resolves.
    #[must_use]
    pub fn hovered_candle(&self) -> Option<(usize, Candle)> {
        let index = self.interaction.pointer().snapped_index?;
        let last = self.candles.len().checked_sub(1)?;
        let clamped = index.min(last);
        Some((clamped, self.candles[clamped]))
    }

    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            viewport: self.viewport,
            pointer: self.interaction.pointer().clone(),
            panels: self.panels.clone(),
            visibility: self.visibility_map(),
        }
    }

    pub fn snapshot_json(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|err| ChartError::InvalidData(format!("snapshot serialization failed: {err}")))
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    // ----- data ingestion --------------------------------------------------

    /// Loads the candle array and scrolls to the most recent data.
    ///
    /// Candles must be strictly time-ascending; the array index becomes the
    /// logical index used everywhere else.
    pub fn set_candles(&mut self, candles: Vec<Candle>) -> ChartResult<()> {
        if candles
            .windows(2)
            .any(|pair| pair[0].time >= pair[1].time)
        {
            return Err(ChartError::InvalidData(
                "candles must be strictly time-ascending".to_owned(),
            ));
        }

        self.candles = candles;
        self.viewport.set_total_candles(self.candles.len());
        self.viewport.scroll_to_latest();

        // Snapped state may refer past the new array end after a shrink.
        if self
            .interaction
            .pointer()
            .snapped_index
            .is_some_and(|index| index >= self.candles.len())
        {
            self.interaction.clear_position();
        }
        self.update_hovered_trade(None);

        debug!(total = self.candles.len(), "candles loaded");
        self.gate.mark_dirty();
        Ok(())
    }

    /// Replaces the indicator set, rebuilding panels while preserving prior
    /// visibility flags (matched on indicator name + panel id).
    pub fn set_indicators(&mut self, indicators: &[IndicatorSeries]) {
        self.panels = build_panels(indicators, &self.panels);
        self.gate.mark_dirty();
    }

    pub fn set_trades(&mut self, trades: Vec<Trade>) {
        self.trades = trades;
        self.update_hovered_trade(None);
        self.gate.mark_dirty();
    }

    /// Swaps the live theme; the next scene re-resolves every color.
    pub fn on_theme_changed(&mut self, theme: Box<dyn Theme>) {
        self.theme = theme;
        self.gate.mark_dirty();
    }

    // ----- host callbacks --------------------------------------------------

    pub fn set_on_visibility_change(
        &mut self,
        callback: impl FnMut(&IndexMap<String, bool>) + 'static,
    ) {
        self.on_visibility_change = Some(Box::new(callback));
    }

    pub fn set_on_hovered_trade_change(
        &mut self,
        callback: impl FnMut(Option<&Trade>) + 'static,
    ) {
        self.on_hovered_trade_change = Some(Box::new(callback));
    }

    /// Toggles the named indicator's group; broadcasts the full visibility
    /// map when anything changed.
    pub fn toggle_indicator(&mut self, indicator_name: &str) -> bool {
        let changed = toggle_indicator_group(&mut self.panels, indicator_name);
        if changed {
            let map = visibility_map(&self.panels);
            if let Some(callback) = self.on_visibility_change.as_mut() {
                callback(&map);
            }
            self.gate.mark_dirty();
        }
        changed
    }

    // ----- scheduling ------------------------------------------------------

    /// Host resize signal, throttled; deferred widths land on a later tick.
    pub fn on_surface_resized(&mut self, width_px: f64, now_seconds: f64) -> ChartResult<()> {
        if let Some(width) = self.resize_throttle.offer(width_px, now_seconds) {
            self.viewport.resize_container(width)?;
            self.gate.mark_dirty();
        }
        Ok(())
    }

    /// Frame tick: applies any pending resize, then redraws once iff dirty.
    ///
    /// Returns `true` when a draw happened.
    pub fn tick(&mut self, now_seconds: f64) -> ChartResult<bool> {
        if let Some(width) = self.resize_throttle.flush(now_seconds) {
            self.viewport.resize_container(width)?;
            self.gate.mark_dirty();
        }

        if !self.gate.take() {
            return Ok(false);
        }
        let scene = self.build_scene();
        self.renderer.render(&scene)?;
        Ok(true)
    }

    /// Unconditional redraw, for host expose events.
    pub fn render(&mut self) -> ChartResult<()> {
        let scene = self.build_scene();
        self.renderer.render(&scene)
    }

    // ----- pointer ---------------------------------------------------------

    pub fn pointer_down(&mut self, x: f64, _y: f64) {
        if self.viewport.is_degenerate() {
            return;
        }
        self.interaction.on_pointer_down(x);
    }

    /// Pointer move: pans while dragging, snaps the crosshair while idle.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> ChartResult<()> {
        if self.viewport.is_degenerate() {
            return Ok(());
        }

        if let Some(delta) = self.interaction.on_drag_move(x) {
            if self.viewport.pan(delta)? {
                self.gate.mark_dirty();
            }
            return Ok(());
        }

        let layout = self.layout();
        let Some(region) = layout.region_at_y(y).cloned() else {
            self.interaction.clear_position();
            self.update_hovered_trade(None);
            self.gate.mark_dirty();
            return Ok(());
        };

        let Some((start, end)) = self.viewport.visible_range() else {
            return Ok(());
        };
        let candle_width = self.viewport.candle_width_px();
        let padding = self.viewport.padding_left_px();
        let Some(index) = snap_index_at_x(x, start, end, candle_width, padding) else {
            self.interaction.clear_position();
            return Ok(());
        };

        let snapped_x = index_to_x(index, start, candle_width, padding);
        let local_y = y - region.header_top_px;
        self.interaction
            .set_snapped_position(snapped_x, local_y, region.panel_id.clone(), index);

        let hovered = if region.panel_id == PRICE_PANEL_ID {
            self.trade_under_pointer(x, local_y, &region)
        } else {
            None
        };
        self.update_hovered_trade(hovered);

        self.gate.mark_dirty();
        Ok(())
    }

    pub fn pointer_up(&mut self) {
        self.interaction.on_pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.update_hovered_trade(None);
        self.interaction.on_pointer_leave();
        self.gate.mark_dirty();
    }

    // ----- zoom / pan ------------------------------------------------------

    /// Wheel zoom anchored at the pointer (`delta_y < 0` zooms in).
    pub fn wheel(&mut self, delta_y: f64, pointer_x: f64) -> ChartResult<()> {
        if self.viewport.is_degenerate() {
            return Ok(());
        }
        let direction = ZoomDirection::from_wheel_delta(delta_y);
        if self.viewport.zoom(direction, pointer_x)? {
            self.resnap_after_zoom();
            self.gate.mark_dirty();
        }
        Ok(())
    }

    pub fn pinch_start(&mut self, distance: f64) {
        self.interaction.on_pinch_start(distance);
    }

    /// Pinch zoom: the factor is the touch-distance ratio, anchored at the
    /// container midpoint.
    pub fn pinch_move(&mut self, distance: f64) -> ChartResult<()> {
        let Some(factor) = self.interaction.on_pinch_move(distance) else {
            return Ok(());
        };
        if self.viewport.is_degenerate() {
            return Ok(());
        }
        if self.viewport.zoom_by_factor(factor, self.container_midpoint_x())? {
            self.resnap_after_zoom();
            self.gate.mark_dirty();
        }
        Ok(())
    }

    pub fn pinch_end(&mut self) {
        self.interaction.on_pinch_end();
    }

    /// Keyboard commands: `+`/`-` step zoom around the container midpoint,
    /// `0` resets to the latest data at zoom 1, arrows pan by 50 px.
    pub fn key_command(&mut self, command: KeyCommand) -> ChartResult<()> {
        if self.viewport.is_degenerate() {
            return Ok(());
        }
        let changed = match command {
            KeyCommand::ZoomIn => {
                let changed = self
                    .viewport
                    .zoom_by_factor(KEY_ZOOM_IN_FACTOR, self.container_midpoint_x())?;
                if changed {
                    self.resnap_after_zoom();
                }
                changed
            }
            KeyCommand::ZoomOut => {
                let changed = self
                    .viewport
                    .zoom_by_factor(KEY_ZOOM_OUT_FACTOR, self.container_midpoint_x())?;
                if changed {
                    self.resnap_after_zoom();
                }
                changed
            }
            KeyCommand::Reset => {
                self.viewport.reset();
                self.resnap_after_zoom();
                true
            }
            KeyCommand::PanLeft => self.viewport.pan(KEY_PAN_STEP_PX)?,
            KeyCommand::PanRight => self.viewport.pan(-KEY_PAN_STEP_PX)?,
        };
        if changed {
            self.gate.mark_dirty();
        }
        Ok(())
    }

    // ----- internals -------------------------------------------------------

    fn layout(&self) -> ChartLayout {
        compute_layout(&self.panels, self.config.layout)
    }

    fn container_midpoint_x(&self) -> f64 {
        self.viewport.padding_left_px() + self.viewport.container_width_px() / 2.0
    }

    /// Re-anchors the crosshair to the stored logical index so it does not
    /// jump when zoom changes the pixel grid.
    fn resnap_after_zoom(&mut self) {
        let Some(index) = self.interaction.pointer().snapped_index else {
            return;
        };
        let Some((start, end)) = self.viewport.visible_range() else {
            self.interaction.clear_position();
            return;
        };
        let Some(position) = self.interaction.pointer().position.clone() else {
            return;
        };

        let clamped = index.clamp(start, end);
        let snapped_x = index_to_x(
            clamped,
            start,
            self.viewport.candle_width_px(),
            self.viewport.padding_left_px(),
        );
        self.interaction.set_snapped_position(
            snapped_x,
            position.y,
            position.origin_panel_id,
            clamped,
        );
    }

    fn trade_under_pointer(
        &self,
        pointer_x: f64,
        local_y: f64,
        region: &PanelRegion,
    ) -> Option<Trade> {
        if self.trades.is_empty() {
            return None;
        }
        let window = self.viewport.visible_range()?;
        let panel = self
            .panels
            .iter()
            .find(|panel| panel.id == PRICE_PANEL_ID)?;
        let plot = RectPx::new(
            self.viewport.padding_left_px(),
            self.config.layout.header_height_px,
            self.viewport.container_width_px(),
            region.plot_height_px(),
        );
        let (value_min, value_max) = price_value_range(&self.candles, panel, window)?;
        let markers = place_trade_markers(
            &self.trades,
            window,
            window.0,
            self.viewport.candle_width_px(),
            plot,
            value_min,
            value_max,
        );
        let trade_index = trades::hit_test(&markers, pointer_x, local_y)?;
        self.trades.get(trade_index).cloned()
    }

    fn update_hovered_trade(&mut self, hovered: Option<Trade>) {
        if self.interaction.set_hovered_trade(hovered.clone()) {
            if let Some(callback) = self.on_hovered_trade_change.as_mut() {
                callback(hovered.as_ref());
            }
            self.gate.mark_dirty();
        }
    }

    /// Materializes the full scene: one frame per visible panel.
    #[must_use]
    pub fn build_scene(&self) -> ChartScene {
        if self.candles.is_empty() || self.viewport.is_degenerate() {
            return ChartScene::no_data();
        }
        let Some(window) = self.viewport.visible_range() else {
            return ChartScene::no_data();
        };

        let layout = self.layout();
        let pointer = self.interaction.pointer().position.as_ref();
        let mut scene = ChartScene {
            frames: Vec::with_capacity(layout.regions.len()),
            total_height_px: layout.total_height_px,
            no_data: false,
        };

        for region in &layout.regions {
            let Some(panel) = self.panels.iter().find(|panel| panel.id == region.panel_id)
            else {
                continue;
            };
            let inputs = PanelSceneInputs {
                viewport: &self.viewport,
                candles: &self.candles,
                theme: self.theme.as_ref(),
                crosshair: pointer.map(|position| CrosshairView {
                    snapped_x: position.x,
                    origin_panel_id: position.origin_panel_id.as_str(),
                    pointer_y: position.y,
                }),
            };
            let mut frame = build_panel_frame(
                panel,
                region,
                self.config.layout.header_height_px,
                &inputs,
            );
            if panel.kind == PanelKind::Price && !self.trades.is_empty() {
                self.push_trade_markers(&mut frame, panel, window);
            }
            scene.frames.push(frame);
        }
        scene
    }

    fn push_trade_markers(
        &self,
        frame: &mut PanelFrame,
        panel: &PanelDescriptor,
        window: (usize, usize),
    ) {
        let Some((value_min, value_max)) = price_value_range(&self.candles, panel, window)
        else {
            return;
        };
        let markers = place_trade_markers(
            &self.trades,
            window,
            window.0,
            self.viewport.candle_width_px(),
            frame.plot_rect,
            value_min,
            value_max,
        );
        let buy = self.theme.color(ThemeRole::CandleUp);
        let sell = self.theme.color(ThemeRole::CandleDown);
        for marker in markers {
            let color = match marker.side {
                TradeSide::Buy => buy,
                TradeSide::Sell => sell,
            };
            frame.push_rect(RectPrimitive::new(
                marker.hit_box.x,
                marker.hit_box.y,
                marker.hit_box.width,
                marker.hit_box.height,
                color,
            ));
        }
    }
}
