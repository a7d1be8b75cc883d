use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::Padding;
use crate::error::ChartResult;
use crate::render::{MonospaceMeasurer, Palette, Region, RenderFrame, Renderer, TextMeasurer, ThemeRegistry};

use super::axis_scene_builder::{draw_category_axis, draw_split_lines, draw_value_axis};
use super::chrome_scene_builder::{draw_background, draw_legend, draw_title};
use super::compositor::{SeriesLayout, compose};
use super::series_scene_builder::SeriesSceneBuilder;
use super::ChartOptions;

/// Turns [`ChartOptions`] into a [`RenderFrame`] and hands it to a backend.
///
/// The engine holds no per-render state, so one engine can render many
/// option sets and separate engines can run on separate threads.
pub struct ChartEngine<R: Renderer, M: TextMeasurer = MonospaceMeasurer> {
    renderer: R,
    measurer: M,
    themes: Arc<ThemeRegistry>,
}

impl<R: Renderer> ChartEngine<R> {
    /// Engine with the default monospace text measurer.
    #[must_use]
    pub fn new(renderer: R, themes: Arc<ThemeRegistry>) -> Self {
        Self::with_measurer(renderer, MonospaceMeasurer::default(), themes)
    }
}

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    #[must_use]
    pub fn with_measurer(renderer: R, measurer: M, themes: Arc<ThemeRegistry>) -> Self {
        Self {
            renderer,
            measurer,
            themes,
        }
    }

    #[must_use]
    pub fn themes(&self) -> &Arc<ThemeRegistry> {
        &self.themes
    }

    #[must_use]
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn validate(&self, options: &ChartOptions) -> ChartResult<Arc<dyn Palette>> {
        if let Err(err) = options.validate() {
            warn!(%err, "rejecting chart options");
            return Err(err);
        }
        self.themes.get(&options.theme).inspect_err(|err| {
            warn!(%err, theme = %options.theme, "rejecting chart options");
        })
    }

    /// Validates `options` and returns the negotiated layout without
    /// drawing anything.
    pub fn layout(&self, options: &ChartOptions) -> ChartResult<SeriesLayout> {
        self.validate(options)?;
        let mut frame = RenderFrame::new(options.viewport());
        let root = Region::root(&mut frame, options.padding);
        Ok(compose(root.bounds(), options, &self.measurer))
    }

    /// Builds the complete primitive list for `options`.
    pub fn build_render_frame(&self, options: &ChartOptions) -> ChartResult<RenderFrame> {
        let palette = self.validate(options)?;
        let palette: &dyn Palette = palette.as_ref();
        let mut frame = RenderFrame::new(options.viewport());

        draw_background(&mut Region::root(&mut frame, Padding::default()), palette);

        {
            let mut root = Region::root(&mut frame, options.padding);
            let layout = compose(root.bounds(), options, &self.measurer);

            if let Some(title) = &layout.title {
                draw_title(&mut root.child_box(title.bounds), title, palette);
            }
            if let Some(legend) = &layout.legend {
                draw_legend(&mut root.child_box(legend.bounds), legend, options, palette);
            }

            let mut series_region = root.child_box(layout.series_box);
            draw_split_lines(&mut series_region, &layout, palette);
            SeriesSceneBuilder {
                options,
                layout: &layout,
                palette,
                measurer: &self.measurer,
            }
            .build(&mut series_region)?;

            // Secondary axes first so the primary axis lands on top.
            for axis in layout.value_axes.iter().rev() {
                draw_value_axis(&mut root.child_box(axis.bounds), axis, palette);
            }
            draw_category_axis(
                &mut root.child_box(layout.category_axis.bounds),
                &layout.category_axis,
                palette,
                &self.measurer,
            );
        }

        debug!(
            primitives = frame.len(),
            series = options.series.len(),
            theme = %options.theme,
            "render frame built"
        );
        Ok(frame)
    }

    /// Builds the frame, validates it and passes it to the renderer.
    pub fn render(&mut self, options: &ChartOptions) -> ChartResult<RenderFrame> {
        let frame = self.build_render_frame(options)?;
        frame.validate()?;
        self.renderer.render(&frame)?;
        Ok(frame)
    }
}
