//! Path geometry in output space: segments, the path accumulator and bounding box.

use crate::graphics::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic Bézier curve.
    CurveTo {
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    ClosePath,
}

impl PathSegment {
    /// Anchor and control points, in path order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) => [Some(p), None, None],
            Self::CurveTo { ctrl1, ctrl2, to } => [Some(ctrl1), Some(ctrl2), Some(to)],
            Self::ClosePath => [None; 3],
        }
        .into_iter()
        .flatten()
    }

    /// Anchor point the segment ends at, None for `ClosePath`.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::CurveTo { to: p, .. } => Some(p),
            Self::ClosePath => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::from_ltrb(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Edges inclusive, tolerate rounding error of `x + w`.
    pub fn contains(&self, p: Point) -> bool {
        const EPS: f64 = 1e-9;
        p.x >= self.x - EPS
            && p.x <= self.right() + EPS
            && p.y >= self.y - EPS
            && p.y <= self.bottom() + EPS
    }
}

/// Bounding box of all anchor and control points.
///
/// Control points of curves are included although they may lie outside of the
/// painted curve, the looser box is what hit-testing of imported artwork expects.
/// Returns None if `segments` has no point.
pub fn bbox(segments: &[PathSegment]) -> Option<BBox> {
    let mut points = segments.iter().flat_map(PathSegment::points);
    let first = points.next()?;
    let (min_x, min_y, max_x, max_y) = points.fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| {
            (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
        },
    );
    Some(BBox::from_ltrb(min_x, min_y, max_x, max_y))
}

/// Accumulates path construction in output space, painting operations take
/// the segments out and leave an empty builder.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
    subpath_start: Option<Point>,
    current: Option<Point>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(PathSegment::MoveTo(p));
        self.subpath_start = Some(p);
        self.current = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        self.segments.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    pub fn curve_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.segments.push(PathSegment::CurveTo { ctrl1, ctrl2, to });
        self.current = Some(to);
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::ClosePath);
        self.current = self.subpath_start;
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Take the accumulated segments, the builder starts a new empty path.
    pub fn take(&mut self) -> Vec<PathSegment> {
        self.subpath_start = None;
        self.current = None;
        std::mem::take(&mut self.segments)
    }

    pub fn clear(&mut self) {
        self.take();
    }
}

#[cfg(test)]
mod tests;
