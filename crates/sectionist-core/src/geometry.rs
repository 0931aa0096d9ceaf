//! Page-space geometry: points, stroked line segments, clip rectangles and
//! the vector drawings a page is made of.
//!
//! Coordinates follow the renderer's page space: the origin is the top-left
//! corner and `y` grows downwards, so sorting by ascending `y` is reading
//! order from top to bottom.

use serde::{Deserialize, Serialize};

/// Largest vertical delta (exclusive) for a segment to count as horizontal.
pub const DEFAULT_HORIZONTAL_TOLERANCE: f32 = 1.0;

/// An `(x, y)` coordinate in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One straight stroke between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Shorthand for a segment from `(x0, y0)` to `(x1, y1)`.
    pub const fn from_coords(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Whether the endpoints differ vertically by less than `tolerance`.
    pub fn is_horizontal(&self, tolerance: f32) -> bool {
        (self.end.y - self.start.y).abs() < tolerance
    }

    /// The `y` used to order and cut at this segment (its start point).
    pub fn y(&self) -> f32 {
        self.start.y
    }
}

/// An axis-aligned rectangle `(x0, y0)`–`(x1, y1)`, used both for page
/// bounds and for clipping text extraction to a band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// A rectangle spanning this one's full width between `top` and `bottom`.
    pub fn band(&self, top: f32, bottom: f32) -> Self {
        Self::new(self.x0, top, self.x1, bottom)
    }

    /// Half-open containment: inclusive on the left/top edges, exclusive on
    /// the bottom edge so that adjacent bands never both claim a point.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y < self.y1
    }
}

/// A single element of a vector path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathItem {
    Line(LineSegment),
    Curve { start: Point, end: Point },
    Rect(Rect),
}

/// One vector drawing (a stroked or filled path) on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub items: Vec<PathItem>,
}

impl Drawing {
    pub fn new(items: Vec<PathItem>) -> Self {
        Self { items }
    }

    /// A drawing holding just the given straight segments.
    pub fn from_lines(lines: impl IntoIterator<Item = LineSegment>) -> Self {
        Self {
            items: lines.into_iter().map(PathItem::Line).collect(),
        }
    }

    /// The straight-line items of this drawing.
    pub fn lines(&self) -> impl Iterator<Item = &LineSegment> {
        self.items.iter().filter_map(|item| match item {
            PathItem::Line(segment) => Some(segment),
            _ => None,
        })
    }
}
