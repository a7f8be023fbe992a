pub mod geometry;
pub mod layout;
pub mod primitives;
pub mod routing;
pub mod types;
pub mod viewport;

pub use layout::{ChartLayout, LayoutConfig, PanelRegion, compute_layout};
pub use routing::{
    OscillatorFamily, PanelDescriptor, PanelKind, Placement, YAxisPolicy, build_panels,
    group_key, route_placement, toggle_indicator_group, visibility_map,
};
pub use types::{Candle, IndicatorKind, IndicatorSeries, SeriesPoint, Trade, TradeSide};
pub use viewport::{SharedViewport, ZoomDirection};
