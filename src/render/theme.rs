use std::fmt::Debug;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

pub const DEFAULT_THEME: &str = "light";

/// Colors a chart pulls from its theme.
pub trait Palette: Debug + Send + Sync {
    fn name(&self) -> &str;
    fn is_dark(&self) -> bool;
    /// Color of the `index`-th series; cycles when the palette runs out.
    fn series_color(&self, index: usize) -> Color;
    /// Number of distinct series colors before cycling.
    fn series_count(&self) -> usize;
    fn axis_color(&self) -> Color;
    fn background_color(&self) -> Color;
    fn text_color(&self) -> Color;

    fn grid_color(&self) -> Color {
        self.axis_color().with_alpha(0.25)
    }

    fn up_color(&self) -> Color {
        Color::rgba8(0x26, 0xa6, 0x9a, 0xff)
    }

    fn down_color(&self) -> Color {
        Color::rgba8(0xef, 0x53, 0x50, 0xff)
    }
}

const LIGHT_SERIES: [(u8, u8, u8); 9] = [
    (0x54, 0x70, 0xc6),
    (0x91, 0xcc, 0x75),
    (0xfa, 0xc8, 0x58),
    (0xee, 0x66, 0x66),
    (0x73, 0xc0, 0xde),
    (0x3b, 0xa2, 0x72),
    (0xfc, 0x84, 0x52),
    (0x9a, 0x60, 0xb4),
    (0xea, 0x7c, 0xcc),
];

const SOLARIZED_SERIES: [(u8, u8, u8); 8] = [
    (0x26, 0x8b, 0xd2),
    (0x2a, 0xa1, 0x98),
    (0x85, 0x99, 0x00),
    (0xb5, 0x89, 0x00),
    (0xcb, 0x4b, 0x16),
    (0xdc, 0x32, 0x2f),
    (0xd3, 0x36, 0x82),
    (0x6c, 0x71, 0xc4),
];

const HIGH_CONTRAST_SERIES: [(u8, u8, u8); 6] = [
    (0x00, 0xff, 0xff),
    (0xff, 0xff, 0x00),
    (0xff, 0x00, 0xff),
    (0x00, 0xff, 0x00),
    (0xff, 0x80, 0x00),
    (0xff, 0xff, 0xff),
];

fn rgb8((red, green, blue): (u8, u8, u8)) -> Color {
    Color::rgba8(red, green, blue, 0xff)
}

/// Built-in palette presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinPalette {
    Light,
    Dark,
    SolarizedLight,
    SolarizedDark,
    HighContrastDark,
}

impl BuiltinPalette {
    pub const ALL: [Self; 5] = [
        Self::Light,
        Self::Dark,
        Self::SolarizedLight,
        Self::SolarizedDark,
        Self::HighContrastDark,
    ];

    fn series(self) -> &'static [(u8, u8, u8)] {
        match self {
            Self::Light | Self::Dark => &LIGHT_SERIES,
            Self::SolarizedLight | Self::SolarizedDark => &SOLARIZED_SERIES,
            Self::HighContrastDark => &HIGH_CONTRAST_SERIES,
        }
    }
}

impl Palette for BuiltinPalette {
    fn name(&self) -> &str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::SolarizedLight => "solarized-light",
            Self::SolarizedDark => "solarized-dark",
            Self::HighContrastDark => "high-contrast-dark",
        }
    }

    fn is_dark(&self) -> bool {
        matches!(
            self,
            Self::Dark | Self::SolarizedDark | Self::HighContrastDark
        )
    }

    fn series_color(&self, index: usize) -> Color {
        let series = self.series();
        rgb8(series[index % series.len()])
    }

    fn series_count(&self) -> usize {
        self.series().len()
    }

    fn axis_color(&self) -> Color {
        match self {
            Self::Light => rgb8((0x6e, 0x70, 0x79)),
            Self::Dark => rgb8((0xb9, 0xb8, 0xce)),
            Self::SolarizedLight => rgb8((0x65, 0x7b, 0x83)),
            Self::SolarizedDark => rgb8((0x93, 0xa1, 0xa1)),
            Self::HighContrastDark => rgb8((0xff, 0xff, 0xff)),
        }
    }

    fn background_color(&self) -> Color {
        match self {
            Self::Light => rgb8((0xff, 0xff, 0xff)),
            Self::Dark => rgb8((0x10, 0x0c, 0x2a)),
            Self::SolarizedLight => rgb8((0xfd, 0xf6, 0xe3)),
            Self::SolarizedDark => rgb8((0x00, 0x2b, 0x36)),
            Self::HighContrastDark => rgb8((0x00, 0x00, 0x00)),
        }
    }

    fn text_color(&self) -> Color {
        match self {
            Self::Light => rgb8((0x46, 0x46, 0x46)),
            Self::Dark => rgb8((0xee, 0xee, 0xee)),
            Self::SolarizedLight => rgb8((0x00, 0x2b, 0x36)),
            Self::SolarizedDark => rgb8((0xee, 0xe8, 0xd5)),
            Self::HighContrastDark => rgb8((0xff, 0xff, 0xff)),
        }
    }
}

/// Palette assembled by [`PaletteBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPalette {
    name: String,
    dark: bool,
    series: Vec<Color>,
    axis: Color,
    background: Color,
    text: Color,
    grid: Option<Color>,
    up: Option<Color>,
    down: Option<Color>,
}

impl Palette for CustomPalette {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dark(&self) -> bool {
        self.dark
    }

    fn series_color(&self, index: usize) -> Color {
        self.series
            .get(index % self.series.len().max(1))
            .copied()
            .unwrap_or(self.axis)
    }

    fn series_count(&self) -> usize {
        self.series.len()
    }

    fn axis_color(&self) -> Color {
        self.axis
    }

    fn background_color(&self) -> Color {
        self.background
    }

    fn text_color(&self) -> Color {
        self.text
    }

    fn grid_color(&self) -> Color {
        self.grid.unwrap_or_else(|| self.axis.with_alpha(0.25))
    }

    fn up_color(&self) -> Color {
        self.up.unwrap_or_else(|| BuiltinPalette::Light.up_color())
    }

    fn down_color(&self) -> Color {
        self.down
            .unwrap_or_else(|| BuiltinPalette::Light.down_color())
    }
}

/// Builds a [`CustomPalette`], starting from another palette's colors.
#[derive(Debug, Clone)]
pub struct PaletteBuilder {
    palette: CustomPalette,
}

impl PaletteBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_palette(name, &BuiltinPalette::Light)
    }

    #[must_use]
    pub fn from_palette(name: impl Into<String>, base: &dyn Palette) -> Self {
        Self {
            palette: CustomPalette {
                name: name.into(),
                dark: base.is_dark(),
                series: (0..base.series_count()).map(|i| base.series_color(i)).collect(),
                axis: base.axis_color(),
                background: base.background_color(),
                text: base.text_color(),
                grid: Some(base.grid_color()),
                up: Some(base.up_color()),
                down: Some(base.down_color()),
            },
        }
    }

    #[must_use]
    pub fn dark(mut self, dark: bool) -> Self {
        self.palette.dark = dark;
        self
    }

    #[must_use]
    pub fn series_colors(mut self, colors: Vec<Color>) -> Self {
        self.palette.series = colors;
        self
    }

    #[must_use]
    pub fn axis_color(mut self, color: Color) -> Self {
        self.palette.axis = color;
        self
    }

    #[must_use]
    pub fn background_color(mut self, color: Color) -> Self {
        self.palette.background = color;
        self
    }

    #[must_use]
    pub fn text_color(mut self, color: Color) -> Self {
        self.palette.text = color;
        self
    }

    #[must_use]
    pub fn grid_color(mut self, color: Color) -> Self {
        self.palette.grid = Some(color);
        self
    }

    #[must_use]
    pub fn candle_colors(mut self, up: Color, down: Color) -> Self {
        self.palette.up = Some(up);
        self.palette.down = Some(down);
        self
    }

    pub fn build(self) -> ChartResult<CustomPalette> {
        let palette = self.palette;
        if palette.name.trim().is_empty() {
            return Err(ChartError::InvalidData(
                "palette name must not be empty".to_owned(),
            ));
        }
        if palette.series.is_empty() {
            return Err(ChartError::InvalidData(
                "palette needs at least one series color".to_owned(),
            ));
        }
        for color in palette
            .series
            .iter()
            .chain([&palette.axis, &palette.background, &palette.text])
            .chain(palette.grid.iter())
            .chain(palette.up.iter())
            .chain(palette.down.iter())
        {
            color.validate()?;
        }
        Ok(palette)
    }
}

/// Name to palette lookup shared across renders.
///
/// Reads are concurrent; `install` appends or replaces (last writer wins).
/// Names are matched case-insensitively.
#[derive(Debug, Default)]
pub struct ThemeRegistry {
    palettes: RwLock<IndexMap<String, Arc<dyn Palette>>>,
}

impl ThemeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every [`BuiltinPalette`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for palette in BuiltinPalette::ALL {
            registry.install(palette.name().to_owned(), palette);
        }
        registry
    }

    /// Process-wide registry with the built-in presets, created on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ThemeRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::with_builtins())))
    }

    pub fn install<P>(&self, name: impl Into<String>, palette: P)
    where
        P: Palette + 'static,
    {
        let name = name.into().to_ascii_lowercase();
        debug!(theme = %name, "install palette");
        self.palettes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::new(palette));
    }

    pub fn get(&self, name: &str) -> ChartResult<Arc<dyn Palette>> {
        self.palettes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ChartError::UnknownTheme(name.to_owned()))
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.palettes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
