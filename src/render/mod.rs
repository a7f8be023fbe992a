mod chrome;
mod frame;
mod null_renderer;
mod panel_scene;
mod primitives;
mod theme;

pub use chrome::{
    AXIS_LABEL_FONT_PX, HORIZONTAL_GRID_LINES, PanelValueFormat, VERTICAL_GRID_BASE_PX,
};
pub use frame::{ChartScene, PanelFrame, RectPx};
pub use null_renderer::NullRenderer;
pub use panel_scene::{
    BODY_WIDTH_RATIO, CandleGeometry, CrosshairView, MIN_BODY_WIDTH_PX, PanelSceneInputs,
    RSI_REFERENCE_LEVELS, VOLUME_BAR_ALPHA, VOLUME_HEADROOM, WICK_WIDTH_RATIO,
    build_panel_frame, oscillator_value_range, price_value_range, project_candle,
    volume_panel_max,
};
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};
pub use theme::{DarkTheme, LightTheme, Theme, ThemeRole};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `ChartScene` so
/// drawing code remains isolated from chart domain and interaction logic.
pub trait Renderer {
    fn render(&mut self, scene: &ChartScene) -> ChartResult<()>;
}
