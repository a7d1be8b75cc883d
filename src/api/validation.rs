use crate::error::{ChartError, ChartResult};

use super::{ChartOptions, SeriesData, SeriesKind, ValueAxisOptions};

pub(super) const MAX_VALUE_AXES: usize = 2;
const MAX_PRECISION: u32 = 12;

pub(super) fn validate_chart_options(options: &ChartOptions) -> ChartResult<()> {
    if !options.viewport().is_valid() {
        return Err(ChartError::InvalidViewport {
            width: options.width,
            height: options.height,
        });
    }
    if !options.font_size.is_finite() || options.font_size <= 0.0 {
        return Err(ChartError::InvalidConfig(
            "font size must be finite and > 0".to_owned(),
        ));
    }
    if options.series.is_empty() {
        return Err(ChartError::EmptySeries);
    }
    if options.value_axes.len() > MAX_VALUE_AXES {
        return Err(ChartError::TooManyValueAxes {
            count: options.value_axes.len(),
        });
    }
    for axis in &options.value_axes {
        validate_value_axis(axis)?;
    }

    let horizontal = options.is_horizontal();
    if horizontal {
        if let Some(other) = options
            .series
            .iter()
            .find(|series| series.kind != SeriesKind::HorizontalBar)
        {
            return Err(ChartError::IncompatibleSeries {
                first: SeriesKind::HorizontalBar.to_string(),
                second: other.kind.to_string(),
            });
        }
    }

    // Horizontal charts have a single value axis along the bottom.
    let axis_count = if horizontal {
        1
    } else {
        options.value_axes.len().max(1)
    };

    for series in &options.series {
        if series.data.is_empty() {
            return Err(ChartError::EmptySeriesData {
                name: series.name.clone(),
            });
        }
        if series.y_axis_index >= axis_count {
            return Err(ChartError::AxisIndexOutOfRange {
                series: series.name.clone(),
                index: series.y_axis_index,
                axis_count,
            });
        }
        let data_fits = match (&series.data, series.kind) {
            (SeriesData::Ohlc(_), SeriesKind::Candlestick) => true,
            (SeriesData::Values(_), kind) => kind != SeriesKind::Candlestick,
            (SeriesData::Ohlc(_), _) => false,
        };
        if !data_fits {
            return Err(ChartError::SeriesDataMismatch {
                name: series.name.clone(),
                kind: series.kind.to_string(),
            });
        }
        validate_series_style(series)?;
    }

    let labels = options.category_axis.labels.len();
    let values = options.category_count();
    if labels > 0 && labels != values {
        return Err(ChartError::CategoryLabelMismatch { labels, values });
    }

    if let Some(title) = &options.title {
        if !title.font_size.is_finite() || title.font_size <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "title font size must be finite and > 0".to_owned(),
            ));
        }
    }

    Ok(())
}

fn validate_value_axis(axis: &ValueAxisOptions) -> ChartResult<()> {
    for (name, bound) in [("min", axis.min), ("max", axis.max)] {
        if bound.is_some_and(|value| !value.is_finite()) {
            return Err(ChartError::InvalidConfig(format!(
                "value axis `{name}` must be finite"
            )));
        }
    }
    if let (Some(min), Some(max)) = (axis.min, axis.max) {
        if min >= max {
            return Err(ChartError::InvalidConfig(
                "value axis min must be < max".to_owned(),
            ));
        }
    }
    if !axis.padding_scale.is_finite() || axis.padding_scale < 0.0 {
        return Err(ChartError::InvalidConfig(
            "value axis padding scale must be finite and >= 0".to_owned(),
        ));
    }
    if axis.precision.is_some_and(|precision| precision > MAX_PRECISION) {
        return Err(ChartError::InvalidConfig(format!(
            "value axis precision must be <= {MAX_PRECISION}"
        )));
    }
    if axis
        .font_size
        .is_some_and(|size| !size.is_finite() || size <= 0.0)
    {
        return Err(ChartError::InvalidConfig(
            "value axis font size must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}

fn validate_series_style(series: &super::SeriesOptions) -> ChartResult<()> {
    let style = series.style;
    if !style.stroke_width.is_finite() || style.stroke_width <= 0.0 {
        return Err(ChartError::InvalidConfig(format!(
            "series `{}` stroke width must be finite and > 0",
            series.name
        )));
    }
    if style.bar_width.is_some_and(|width| width <= 0) {
        return Err(ChartError::InvalidConfig(format!(
            "series `{}` bar width must be > 0",
            series.name
        )));
    }
    if !style.margin_ratio.is_finite() || !(0.0..0.5).contains(&style.margin_ratio) {
        return Err(ChartError::InvalidConfig(format!(
            "series `{}` margin ratio must be in [0, 0.5)",
            series.name
        )));
    }
    if let Some(color) = style.color {
        color.validate()?;
    }
    Ok(())
}
