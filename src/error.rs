use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("series list must not be empty")]
    EmptySeries,

    #[error("series `{name}` has no data")]
    EmptySeriesData { name: String },

    #[error("at most two value axes are supported, got {count}")]
    TooManyValueAxes { count: usize },

    #[error("series `{series}` targets value axis {index}, but only {axis_count} are configured")]
    AxisIndexOutOfRange {
        series: String,
        index: usize,
        axis_count: usize,
    },

    #[error("series kinds `{first}` and `{second}` cannot share one chart")]
    IncompatibleSeries { first: String, second: String },

    #[error("series `{name}` carries data that does not fit kind `{kind}`")]
    SeriesDataMismatch { name: String, kind: String },

    #[error("category axis has {labels} labels but series data has {values} values")]
    CategoryLabelMismatch { labels: usize, values: usize },

    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("degenerate fit: {0}")]
    DegenerateFit(String),
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
