//! Chart option model, layout negotiation and scene building.

mod axis_scene_builder;
mod chrome_scene_builder;
mod compositor;
mod engine;
mod label_format;
mod options;
mod series_scene_builder;
mod validation;

pub use axis_scene_builder::label_stride;
pub use compositor::{
    AXIS_LABEL_GAP, AxisSide, CATEGORY_AXIS_HEIGHT, CategoryAxisLayout, LEGEND_SWATCH_SIZE,
    LegendItem, LegendLayout, SeriesLayout, TICK_LENGTH, TitleLayout, ValueAxisLayout, compose,
    series_min_max,
};
pub use engine::ChartEngine;
pub use label_format::{format_axis_value, format_tick_labels, precision_for_step};
pub use options::{
    CategoryAxisOptions, ChartOptions, LegendOptions, SeriesData, SeriesKind, SeriesOptions,
    SeriesStyle, TitleOptions, TitlePosition, ValueAxisOptions,
};
pub use series_scene_builder::{SlotPlan, plan_slots};
