mod engine;
mod engine_config;
mod invalidation;
mod snapshot;

pub use engine::{ChartEngine, HoveredTradeCallback, VisibilityCallback};
pub use engine_config::ChartEngineConfig;
pub use invalidation::{RedrawGate, ResizeThrottle};
pub use snapshot::EngineSnapshot;
