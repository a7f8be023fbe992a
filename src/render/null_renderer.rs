use crate::error::ChartResult;
use crate::render::{ChartScene, Renderer};

/// No-op renderer used by tests and headless engine usage.
///
/// It still validates scene content so tests can catch invalid geometry
/// before a real backend is introduced.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_calls: usize,
    pub last_frame_count: usize,
    pub last_line_count: usize,
    pub last_rect_count: usize,
    pub last_text_count: usize,
    pub last_was_no_data: bool,
}

impl Renderer for NullRenderer {
    fn render(&mut self, scene: &ChartScene) -> ChartResult<()> {
        scene.validate()?;
        self.render_calls += 1;
        self.last_frame_count = scene.frames.len();
        self.last_line_count = scene.frames.iter().map(|frame| frame.lines.len()).sum();
        self.last_rect_count = scene.frames.iter().map(|frame| frame.rects.len()).sum();
        self.last_text_count = scene.frames.iter().map(|frame| frame.texts.len()).sum();
        self.last_was_no_data = scene.no_data;
        Ok(())
    }
}
