use serde::{Deserialize, Serialize};

/// Output surface size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A point in absolute device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Insets applied on each side when deriving a child region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub left: i32,
}

impl Padding {
    #[must_use]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    #[must_use]
    pub const fn top(value: i32) -> Self {
        Self::new(value, 0, 0, 0)
    }

    #[must_use]
    pub const fn bottom(value: i32) -> Self {
        Self::new(0, 0, value, 0)
    }

    #[must_use]
    pub const fn left(value: i32) -> Self {
        Self::new(0, 0, 0, value)
    }

    #[must_use]
    pub const fn right(value: i32) -> Self {
        Self::new(0, value, 0, 0)
    }
}

/// Absolute pixel rectangle; `right`/`bottom` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl RegionBox {
    #[must_use]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub fn from_viewport(viewport: Viewport) -> Self {
        let width = i32::try_from(viewport.width).unwrap_or(i32::MAX);
        let height = i32::try_from(viewport.height).unwrap_or(i32::MAX);
        Self::new(0, width, height, 0)
    }

    #[must_use]
    pub fn width(self) -> i32 {
        (self.right - self.left).max(0)
    }

    #[must_use]
    pub fn height(self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Applies `padding` inward.
    ///
    /// Over-padding collapses the box to zero size at its top-left corner
    /// instead of producing inverted edges.
    #[must_use]
    pub fn shrink(self, padding: Padding) -> Self {
        let left = self.left + padding.left.max(0);
        let top = self.top + padding.top.max(0);
        let right = (self.right - padding.right.max(0)).max(left);
        let bottom = (self.bottom - padding.bottom.max(0)).max(top);
        Self {
            top,
            right,
            bottom,
            left: left.min(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Padding, RegionBox};

    #[test]
    fn over_padding_collapses_to_zero_size() {
        let region = RegionBox::new(0, 100, 50, 0).shrink(Padding::new(40, 80, 40, 30));
        assert_eq!(region.width(), 0);
        assert_eq!(region.height(), 0);
        assert!(region.is_empty());
    }

    #[test]
    fn negative_padding_is_ignored() {
        let region = RegionBox::new(10, 100, 50, 10).shrink(Padding::uniform(-5));
        assert_eq!(region, RegionBox::new(10, 100, 50, 10));
    }
}
