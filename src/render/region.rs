use crate::core::{Padding, Point, RegionBox};
use crate::render::{
    Color, LinePrimitive, PolygonPrimitive, Primitive, RectPrimitive, RenderFrame, Stroke,
    TextHAlign, TextPrimitive,
};

/// Current paint settings of a region; children inherit a copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub fill_color: Color,
    pub font_color: Color,
    pub font_size_px: f64,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::rgb(0.0, 0.0, 0.0),
            stroke_width: 1.0,
            fill_color: Color::TRANSPARENT,
            font_color: Color::rgb(0.0, 0.0, 0.0),
            font_size_px: 12.0,
        }
    }
}

/// Rectangular drawing area that emits primitives into a frame.
///
/// Coordinates passed to drawing calls are relative to the region's top-left
/// corner. A child region mutably borrows its parent, so a region tree is
/// strictly nested and siblings never draw concurrently.
#[derive(Debug)]
pub struct Region<'f> {
    frame: &'f mut RenderFrame,
    bounds: RegionBox,
    style: PaintStyle,
}

impl<'f> Region<'f> {
    /// Region covering the whole frame viewport minus `padding`.
    pub fn root(frame: &'f mut RenderFrame, padding: Padding) -> Self {
        let bounds = RegionBox::from_viewport(frame.viewport).shrink(padding);
        Self {
            frame,
            bounds,
            style: PaintStyle::default(),
        }
    }

    /// Child region inset by `padding`.
    pub fn child(&mut self, padding: Padding) -> Region<'_> {
        Region {
            bounds: self.bounds.shrink(padding),
            style: self.style,
            frame: &mut *self.frame,
        }
    }

    /// Child region over an absolute box, clipped to this region.
    pub fn child_box(&mut self, bounds: RegionBox) -> Region<'_> {
        let left = bounds.left.clamp(self.bounds.left, self.bounds.right);
        let right = bounds.right.clamp(left, self.bounds.right);
        let top = bounds.top.clamp(self.bounds.top, self.bounds.bottom);
        let bottom = bounds.bottom.clamp(top, self.bounds.bottom);
        Region {
            bounds: RegionBox::new(top, right, bottom, left),
            style: self.style,
            frame: &mut *self.frame,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> RegionBox {
        self.bounds
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    #[must_use]
    pub fn style(&self) -> PaintStyle {
        self.style
    }

    pub fn set_style(&mut self, style: PaintStyle) {
        self.style = style;
    }

    pub fn set_stroke(&mut self, color: Color, width: f64) {
        self.style.stroke_color = color;
        self.style.stroke_width = width;
    }

    pub fn set_fill(&mut self, color: Color) {
        self.style.fill_color = color;
    }

    pub fn set_font(&mut self, color: Color, size_px: f64) {
        self.style.font_color = color;
        self.style.font_size_px = size_px;
    }

    fn absolute(&self, point: Point) -> Point {
        Point::new(
            f64::from(self.bounds.left) + point.x,
            f64::from(self.bounds.top) + point.y,
        )
    }

    fn stroke(&self) -> Option<Stroke> {
        (self.style.stroke_width > 0.0 && !self.style.stroke_color.is_transparent()).then_some(
            Stroke {
                color: self.style.stroke_color,
                width: self.style.stroke_width,
            },
        )
    }

    /// Strokes a polyline with the current stroke style.
    pub fn line(&mut self, points: &[Point]) {
        if points.len() < 2 || self.stroke().is_none() {
            return;
        }
        let absolute = points.iter().map(|point| self.absolute(*point)).collect();
        self.frame.push(Primitive::Line(LinePrimitive::new(
            absolute,
            self.style.stroke_width,
            self.style.stroke_color,
        )));
    }

    pub fn line_segment(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.line(&[Point::new(x1, y1), Point::new(x2, y2)]);
    }

    /// Fills a closed polygon and outlines it with the current stroke.
    pub fn polygon(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }
        let absolute = points.iter().map(|point| self.absolute(*point)).collect();
        self.frame.push(Primitive::Polygon(PolygonPrimitive {
            points: absolute,
            fill: self.style.fill_color,
            stroke: self.stroke(),
        }));
    }

    /// Fills an axis-aligned rectangle. Negative sizes are normalized.
    pub fn rect(&mut self, left: f64, top: f64, width: f64, height: f64) {
        let origin = self.absolute(Point::new(left.min(left + width), top.min(top + height)));
        self.frame.push(Primitive::Rect(RectPrimitive {
            x: origin.x,
            y: origin.y,
            width: width.abs(),
            height: height.abs(),
            fill: self.style.fill_color,
            stroke: self.stroke(),
        }));
    }

    /// Draws text with its baseline at `(x, y)` using the current font.
    pub fn text(&mut self, text: &str, x: f64, y: f64, h_align: TextHAlign) {
        self.text_rotated(text, x, y, h_align, 0.0);
    }

    pub fn text_rotated(&mut self, text: &str, x: f64, y: f64, h_align: TextHAlign, degrees: f64) {
        if text.is_empty() {
            return;
        }
        let at = self.absolute(Point::new(x, y));
        self.frame.push(Primitive::Text(
            TextPrimitive::new(
                text,
                at.x,
                at.y,
                self.style.font_size_px,
                self.style.font_color,
                h_align,
            )
            .rotated(degrees),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::Region;
    use crate::core::{Padding, RegionBox, Viewport};
    use crate::render::{Color, RenderFrame};

    #[test]
    fn child_coordinates_are_translated_to_absolute_pixels() {
        let mut frame = RenderFrame::new(Viewport::new(200, 100));
        {
            let mut root = Region::root(&mut frame, Padding::uniform(10));
            let mut child = root.child(Padding::new(5, 0, 0, 20));
            assert_eq!(child.bounds(), RegionBox::new(15, 190, 90, 30));
            child.set_stroke(Color::rgb(1.0, 0.0, 0.0), 2.0);
            child.line_segment(0.0, 0.0, 10.0, 0.0);
        }
        let line = frame.lines().next().expect("one line");
        assert_eq!(line.points[0].x, 30.0);
        assert_eq!(line.points[0].y, 15.0);
        assert_eq!(line.points[1].x, 40.0);
    }

    #[test]
    fn child_box_is_clipped_to_parent() {
        let mut frame = RenderFrame::new(Viewport::new(100, 100));
        let mut root = Region::root(&mut frame, Padding::uniform(10));
        let child = root.child_box(RegionBox::new(-20, 500, 50, 0));
        assert_eq!(child.bounds(), RegionBox::new(10, 90, 50, 10));
    }
}
