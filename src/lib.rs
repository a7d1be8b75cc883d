//! chart-geometry: layout and geometry core for bar, line and candlestick charts.
//!
//! The crate turns a declarative [`api::ChartOptions`] into a flat
//! [`render::RenderFrame`] of lines, polygons, rectangles and text. Drawing
//! to a real surface is left to a [`render::Renderer`] implementation.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartOptions, SeriesKind, SeriesOptions};
pub use error::{ChartError, ChartResult};
