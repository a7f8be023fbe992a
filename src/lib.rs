//! chartpanes: multi-panel financial charting engine.
//!
//! This crate provides the coordinate-transform, panel-composition and
//! pointer-interaction core of a candlestick chart with overlay indicators,
//! oscillator panels and a volume panel, all sharing one horizontal viewport.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
