use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectPx {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectPx {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn contains(self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
            || self.width < 0.0
            || self.height < 0.0
        {
            return Err(ChartError::InvalidData(
                "rect must be finite with non-negative extent".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Backend-agnostic scene for one panel's draw pass.
///
/// Each panel owns its frame exclusively; series primitives are clipped by
/// backends to `plot_rect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelFrame {
    pub panel_id: String,
    pub plot_rect: RectPx,
    pub lines: Vec<LinePrimitive>,
    pub rects: Vec<RectPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl PanelFrame {
    #[must_use]
    pub fn new(panel_id: impl Into<String>, plot_rect: RectPx) -> Self {
        Self {
            panel_id: panel_id.into(),
            plot_rect,
            lines: Vec::new(),
            rects: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: LinePrimitive) {
        self.lines.push(line);
    }

    pub fn push_rect(&mut self, rect: RectPrimitive) {
        self.rects.push(rect);
    }

    pub fn push_text(&mut self, text: TextPrimitive) {
        self.texts.push(text);
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.plot_rect.validate()?;
        for line in &self.lines {
            line.validate()?;
        }
        for rect in &self.rects {
            rect.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }
}

/// Full composed scene: one frame per visible panel, in stacking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartScene {
    pub frames: Vec<PanelFrame>,
    pub total_height_px: f64,
    pub no_data: bool,
}

impl ChartScene {
    #[must_use]
    pub fn no_data() -> Self {
        Self {
            frames: Vec::new(),
            total_height_px: 0.0,
            no_data: true,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        for frame in &self.frames {
            frame.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn frame(&self, panel_id: &str) -> Option<&PanelFrame> {
        self.frames.iter().find(|frame| frame.panel_id == panel_id)
    }
}
