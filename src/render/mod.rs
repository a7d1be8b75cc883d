mod frame;
mod null_renderer;
mod primitives;
mod region;
mod text;
pub mod theme;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, PolygonPrimitive, Primitive, RectPrimitive, Stroke, TextHAlign,
    TextPrimitive,
};
pub use region::{PaintStyle, Region};
pub use text::{MonospaceMeasurer, TextExtent, TextMeasurer};
pub use theme::{BuiltinPalette, CustomPalette, Palette, PaletteBuilder, ThemeRegistry};

use crate::error::ChartResult;

/// Rasterizing or encoding backend.
///
/// Receives the finished frame; layout and geometry are already resolved.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
