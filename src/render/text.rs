use serde::{Deserialize, Serialize};

/// Measured size of a rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

impl TextExtent {
    /// Axis-aligned bounding size after rotating by `degrees`.
    #[must_use]
    pub fn rotated(self, degrees: f64) -> Self {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            width: self.width * cos.abs() + self.height * sin.abs(),
            height: self.width * sin.abs() + self.height * cos.abs(),
        }
    }
}

/// Glyph measurement seam. Font loading and shaping live behind it.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size_px: f64) -> TextExtent;
}

/// Deterministic measurer that assumes a fixed advance per character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonospaceMeasurer {
    pub char_width_ratio: f64,
    pub line_height_ratio: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font_size_px: f64) -> TextExtent {
        let longest = text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let lines = text.lines().count().max(1);
        TextExtent {
            width: longest as f64 * font_size_px * self.char_width_ratio,
            height: lines as f64 * font_size_px * self.line_height_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MonospaceMeasurer, TextExtent, TextMeasurer};

    #[test]
    fn monospace_width_scales_with_characters() {
        let measurer = MonospaceMeasurer::default();
        let short = measurer.measure("10", 10.0);
        let long = measurer.measure("1000", 10.0);
        assert!((short.width - 12.0).abs() < 1e-9);
        assert!((long.width - 24.0).abs() < 1e-9);
        assert!((long.height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn quarter_turn_swaps_extent() {
        let extent = TextExtent {
            width: 40.0,
            height: 10.0,
        }
        .rotated(90.0);
        assert!((extent.width - 10.0).abs() < 1e-9);
        assert!((extent.height - 40.0).abs() < 1e-9);
    }
}
