use serde::{Deserialize, Serialize};

use crate::core::LayoutConfig;
use crate::error::{ChartError, ChartResult};

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    pub container_width_px: f64,
    /// Pixel width of one candle slot at zoom factor 1.0.
    pub base_candle_width_px: f64,
    pub padding_left_px: f64,
    #[serde(default = "default_layout")]
    pub layout: LayoutConfig,
    /// Minimum spacing between applied container resizes; the last burst
    /// width is flushed on the next tick after the interval elapses.
    #[serde(default = "default_resize_interval")]
    pub resize_min_interval_seconds: f64,
}

fn default_layout() -> LayoutConfig {
    LayoutConfig::default()
}

fn default_resize_interval() -> f64 {
    0.1
}

impl ChartEngineConfig {
    /// Creates a minimal config with default candle width and layout.
    #[must_use]
    pub fn new(container_width_px: f64) -> Self {
        Self {
            container_width_px,
            base_candle_width_px: 8.0,
            padding_left_px: 0.0,
            layout: default_layout(),
            resize_min_interval_seconds: default_resize_interval(),
        }
    }

    #[must_use]
    pub fn with_base_candle_width(mut self, width_px: f64) -> Self {
        self.base_candle_width_px = width_px;
        self
    }

    #[must_use]
    pub fn with_padding_left(mut self, padding_px: f64) -> Self {
        self.padding_left_px = padding_px;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_resize_min_interval(mut self, seconds: f64) -> Self {
        self.resize_min_interval_seconds = seconds;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.container_width_px.is_finite() || self.container_width_px < 0.0 {
            return Err(ChartError::InvalidContainer {
                width_px: self.container_width_px,
            });
        }
        if !self.base_candle_width_px.is_finite() || self.base_candle_width_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "base candle width must be finite and > 0".to_owned(),
            ));
        }
        if !self.padding_left_px.is_finite() || self.padding_left_px < 0.0 {
            return Err(ChartError::InvalidData(
                "left padding must be finite and >= 0".to_owned(),
            ));
        }
        if !self.resize_min_interval_seconds.is_finite() || self.resize_min_interval_seconds < 0.0 {
            return Err(ChartError::InvalidData(
                "resize throttle interval must be finite and >= 0".to_owned(),
            ));
        }
        self.layout.validate()?;
        Ok(self)
    }
}
