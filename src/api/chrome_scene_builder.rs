use crate::render::{Color, Palette, Region, TextHAlign};

use super::ChartOptions;
use super::axis_scene_builder::BASELINE_SHIFT;
use super::compositor::{LegendLayout, TitleLayout};

pub(super) fn draw_background(region: &mut Region<'_>, palette: &dyn Palette) {
    region.set_stroke(Color::TRANSPARENT, 0.0);
    region.set_fill(palette.background_color());
    region.rect(
        0.0,
        0.0,
        f64::from(region.width()),
        f64::from(region.height()),
    );
}

/// Title left-aligned in its band, subtitle underneath in a smaller font.
pub(super) fn draw_title(region: &mut Region<'_>, title: &TitleLayout, palette: &dyn Palette) {
    region.set_font(palette.text_color(), title.font_size);
    let baseline = title.font_size * (0.5 + BASELINE_SHIFT);
    region.text(&title.text, 0.0, baseline, TextHAlign::Left);

    if let Some(subtitle) = &title.subtitle {
        let color = palette.text_color().with_alpha(0.7);
        region.set_font(color, title.subtitle_font_size);
        region.text(
            subtitle,
            0.0,
            baseline + title.font_size * 0.5 + title.subtitle_font_size,
            TextHAlign::Left,
        );
    }
}

pub(super) fn draw_legend(
    region: &mut Region<'_>,
    legend: &LegendLayout,
    options: &ChartOptions,
    palette: &dyn Palette,
) {
    let origin_left = f64::from(region.bounds().left);
    let origin_top = f64::from(region.bounds().top);
    region.set_stroke(Color::TRANSPARENT, 0.0);
    for item in &legend.items {
        let color = options
            .series
            .get(item.series_index)
            .and_then(|series| series.style.color)
            .unwrap_or_else(|| palette.series_color(item.series_index));
        region.set_fill(color);
        region.rect(
            f64::from(item.swatch.left) - origin_left,
            f64::from(item.swatch.top) - origin_top,
            f64::from(item.swatch.width()),
            f64::from(item.swatch.height()),
        );
        region.set_font(palette.text_color(), legend.font_size);
        region.text(
            &item.name,
            item.text_x - origin_left,
            item.text_baseline - origin_top,
            TextHAlign::Left,
        );
    }
}
