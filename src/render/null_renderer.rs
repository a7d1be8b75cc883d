use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Headless backend that draws nothing.
///
/// Frames are validated before they are counted, so invalid geometry fails
/// here the same way it would in a rasterizing backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_primitive_count: usize,
    pub last_line_count: usize,
    pub last_text_count: usize,
    /// Rectangles plus polygons.
    pub last_shape_count: usize,
    pub frames_rendered: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_primitive_count = frame.len();
        self.last_line_count = frame.lines().count();
        self.last_text_count = frame.texts().count();
        self.last_shape_count = frame.rects().count() + frame.polygons().count();
        self.frames_rendered += 1;
        Ok(())
    }
}
