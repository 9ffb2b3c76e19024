use lyon::geom::CubicBezierSegment;

use super::prelude::*;
use crate::renderer::{ line::LineRendererKind, point::PointRendererKind, spline::SplineRendererKind };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    /// Width in pixels, only the breadth-aware rasterizers read it.
    pub breadth: f32,
    pub renderer: Option<LineRendererKind>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { color: Color::WHITE, breadth: 1.0, renderer: None }
    }
}

/// A segment between two pixel centers.
///
/// The classification accessors decide which branch a rasterizer takes. Ties are broken with
/// strict comparisons, so a zero-length segment reports `end` as every extreme point and is
/// neither leftward nor rightward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: PixelPoint,
    pub end: PixelPoint,
    pub style: LineStyle,
}

impl LineSegment {
    pub fn new(start: PixelPoint, end: PixelPoint, style: LineStyle) -> Self {
        Self { start, end, style }
    }

    pub fn between(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(PixelPoint::new(x0, y0), PixelPoint::new(x1, y1), LineStyle::default())
    }

    pub fn with_style(self, style: LineStyle) -> Self {
        Self { style, ..self }
    }

    /// Widened so that any two `i32` end points have a representable difference.
    pub fn dx(&self) -> i64 {
        self.end.x as i64 - self.start.x as i64
    }

    pub fn dy(&self) -> i64 {
        self.end.y as i64 - self.start.y as i64
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).to_f32().length()
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// `dy / dx`, infinite (or NaN for a zero-length segment) when vertical.
    pub fn slope(&self) -> f64 {
        self.dy() as f64 / self.dx() as f64
    }

    /// The `b` of `y = slope * x + b`.
    pub fn y_intercept(&self) -> f64 {
        self.start.y as f64 - self.slope() * self.start.x as f64
    }

    /// The `c` of `x = y / slope + c`.
    pub fn x_intercept(&self) -> f64 {
        self.start.x as f64 - self.start.y as f64 * self.dx() as f64 / self.dy() as f64
    }

    pub fn is_vertical(&self) -> bool {
        self.dx() == 0
    }

    pub fn is_horizontal(&self) -> bool {
        self.dy() == 0
    }

    pub fn is_orthogonal(&self) -> bool {
        self.is_vertical() || self.is_horizontal()
    }

    pub fn is_45_degree(&self) -> bool {
        self.dx().abs() == self.dy().abs()
    }

    pub fn is_leftward(&self) -> bool {
        self.end.x < self.start.x
    }

    pub fn is_rightward(&self) -> bool {
        self.end.x > self.start.x
    }

    /// +y points up in world space.
    pub fn is_upward(&self) -> bool {
        self.end.y > self.start.y
    }

    pub fn is_downward(&self) -> bool {
        self.end.y < self.start.y
    }

    pub fn leftmost(&self) -> PixelPoint {
        if self.start.x < self.end.x { self.start } else { self.end }
    }

    pub fn rightmost(&self) -> PixelPoint {
        if self.start.x > self.end.x { self.start } else { self.end }
    }

    pub fn topmost(&self) -> PixelPoint {
        if self.start.y > self.end.y { self.start } else { self.end }
    }

    pub fn bottommost(&self) -> PixelPoint {
        if self.start.y < self.end.y { self.start } else { self.end }
    }

    pub fn reversed(&self) -> Self {
        Self { start: self.end, end: self.start, style: self.style }
    }

    /// Clamps to the `i32` range instead of wrapping.
    pub fn translated(&self, offset: PixelVector) -> Self {
        Self { start: offset_pixel(self.start, offset), end: offset_pixel(self.end, offset), style: self.style }
    }
}

pub fn offset_pixel(pixel: PixelPoint, offset: PixelVector) -> PixelPoint {
    PixelPoint::new(pixel.x.saturating_add(offset.x), pixel.y.saturating_add(offset.y))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub color: Color,
    /// Stamp diameter in pixels.
    pub size: i32,
    pub renderer: Option<PointRendererKind>,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self { color: Color::WHITE, size: 5, renderer: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPrimitive {
    pub position: PixelPoint,
    pub style: PointStyle,
}

impl PointPrimitive {
    pub fn new(position: PixelPoint, style: PointStyle) -> Self {
        Self { position, style }
    }
}

/// Cubic Bezier through four control points, in world (sub-pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSpline {
    segment: CubicBezierSegment<f32>,
}

impl CubicSpline {
    pub fn new(p0: WorldPoint, p1: WorldPoint, p2: WorldPoint, p3: WorldPoint) -> Self {
        Self {
            segment: CubicBezierSegment {
                from: p0.cast_unit(),
                ctrl1: p1.cast_unit(),
                ctrl2: p2.cast_unit(),
                to: p3.cast_unit(),
            },
        }
    }

    pub fn control_points(&self) -> [WorldPoint; 4] {
        let s = &self.segment;
        [s.from.cast_unit(), s.ctrl1.cast_unit(), s.ctrl2.cast_unit(), s.to.cast_unit()]
    }

    /// Bernstein blend of the control points. `t` outside `[0, 1]` extrapolates.
    pub fn value_at(&self, t: f32) -> WorldPoint {
        self.segment.sample(t).cast_unit()
    }

    pub fn transformed(&self, transform: &Transform2D) -> Self {
        let [p0, p1, p2, p3] = self.control_points();
        Self::new(transform.transform(p0), transform.transform(p1), transform.transform(p2), transform.transform(p3))
    }

    /// Bounding box of the control polygon, which contains the curve.
    pub fn bounding_box(&self) -> WorldRect {
        let points = self.control_points();
        bounding_rect(points.iter()).unwrap_or_else(|| WorldRect::new(points[0], points[0]))
    }

    pub fn approximate_length(&self, tolerance: f32) -> f32 {
        self.segment.approximate_length(tolerance)
    }

    pub fn is_finite(&self) -> bool {
        self.control_points().iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineStyle {
    pub color: Color,
    pub breadth: f32,
    pub renderer: Option<SplineRendererKind>,
    /// Stamp drawn on both end points.
    pub endpoint_style: Option<PointStyle>,
    /// Stamp drawn on the curve at `t = 0.5`.
    pub midpoint_style: Option<PointStyle>,
}

impl Default for SplineStyle {
    fn default() -> Self {
        Self { color: Color::WHITE, breadth: 1.0, renderer: None, endpoint_style: None, midpoint_style: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplinePrimitive {
    pub spline: CubicSpline,
    pub style: SplineStyle,
}

impl SplinePrimitive {
    pub fn new(spline: CubicSpline, style: SplineStyle) -> Self {
        Self { spline, style }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub color: Color,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self { color: Color::WHITE }
    }
}

/// The closed side of the line through `origin` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub origin: WorldPoint,
    pub direction: WorldVector,
}

impl HalfPlane {
    /// Points on the left of `from -> to` (for +y up) are inside.
    pub fn left_of(from: WorldPoint, to: WorldPoint) -> Self {
        Self { origin: from, direction: to - from }
    }

    /// Signed distance-like measure, non-negative inside.
    pub fn side(&self, point: WorldPoint) -> f32 {
        self.direction.cross(point - self.origin)
    }

    pub fn contains(&self, point: WorldPoint) -> bool {
        // tolerance keeps points exactly on an edge inside despite rounding
        self.side(point) >= -1e-3 * self.direction.length().max(1.0)
    }
}

/// A convex polygon described both by its vertices and by one half-plane per edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFill {
    vertices: Vec<WorldPoint>,
    half_planes: Vec<HalfPlane>,
    pub style: FillStyle,
}

impl PolygonFill {
    /// Either winding is accepted, the half-planes are oriented by the sign of the area.
    /// Fewer than three vertices or a zero area produce an empty fill.
    pub fn new(vertices: Vec<WorldPoint>, style: FillStyle) -> Self {
        let area = signed_area(&vertices);
        let half_planes = if vertices.len() < 3 || area == 0.0 || !area.is_finite() {
            Vec::new()
        } else {
            let count = vertices.len();
            (0..count)
                .map(|i| {
                    let (from, to) = (vertices[i], vertices[(i + 1) % count]);
                    if area > 0.0 { HalfPlane::left_of(from, to) } else { HalfPlane::left_of(to, from) }
                })
                .collect()
        };

        Self { vertices, half_planes, style }
    }

    pub fn vertices(&self) -> &[WorldPoint] {
        &self.vertices
    }

    pub fn half_planes(&self) -> &[HalfPlane] {
        &self.half_planes
    }

    pub fn is_empty(&self) -> bool {
        self.half_planes.is_empty()
    }

    pub fn contains(&self, point: WorldPoint) -> bool {
        !self.half_planes.is_empty() && self.half_planes.iter().all(|plane| plane.contains(point))
    }

    pub fn transformed(&self, transform: &Transform2D) -> Self {
        Self::new(self.vertices.iter().map(|v| transform.transform(*v)).collect(), self.style)
    }
}

/// Shoelace area, positive for counter-clockwise winding.
fn signed_area(vertices: &[WorldPoint]) -> f32 {
    let count = vertices.len();
    (0..count)
        .map(|i| vertices[i].to_vector().cross(vertices[(i + 1) % count].to_vector()))
        .sum::<f32>()
        / 2.0
}

#[cfg(test)]
mod test_primitive {
    use super::*;

    #[test]
    fn test_deltas_span_the_whole_range() {
        let widest = LineSegment::between(i32::MIN, i32::MAX, i32::MAX, i32::MIN);
        assert_eq!(widest.dx(), u32::MAX as i64);
        assert_eq!(widest.dy(), -(u32::MAX as i64));
        assert!(widest.is_45_degree());

        let shifted = LineSegment::between(i32::MAX - 1, 0, i32::MAX, 0).translated(PixelVector::new(5, -1));
        assert_eq!(shifted.start, PixelPoint::new(i32::MAX, -1));
        assert_eq!(shifted.end, PixelPoint::new(i32::MAX, -1));
    }

    #[test]
    fn test_line_classification() {
        let line = LineSegment::between(0, 0, 10, 4);
        assert_eq!(line.dx(), 10);
        assert_eq!(line.dy(), 4);
        assert!((line.slope() - 0.4).abs() < 1e-9);
        assert!(line.y_intercept().abs() < 1e-9);
        assert!(line.is_rightward() && line.is_upward());
        assert!(!line.is_orthogonal() && !line.is_45_degree());
        assert_eq!(line.leftmost(), PixelPoint::new(0, 0));
        assert_eq!(line.rightmost(), PixelPoint::new(10, 4));
        assert_eq!(line.topmost(), PixelPoint::new(10, 4));
        assert_eq!(line.bottommost(), PixelPoint::new(0, 0));

        let back = line.reversed();
        assert!(back.is_leftward() && back.is_downward());
        assert_eq!(back.leftmost(), PixelPoint::new(0, 0));
    }

    #[test]
    fn test_degenerate_line_ties() {
        let dot = LineSegment::between(3, 3, 3, 3);
        assert!(dot.is_degenerate());
        assert!(dot.is_vertical() && dot.is_horizontal() && dot.is_45_degree());
        assert!(!dot.is_leftward() && !dot.is_rightward());
        assert!(!dot.is_upward() && !dot.is_downward());
        assert_eq!(dot.leftmost(), dot.end);
        assert_eq!(dot.topmost(), dot.end);
    }

    #[test]
    fn test_intercepts() {
        let line = LineSegment::between(2, 1, 6, 9);
        assert!((line.slope() - 2.0).abs() < 1e-9);
        assert!((line.y_intercept() + 3.0).abs() < 1e-9);
        assert!((line.x_intercept() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_spline_endpoints() {
        let spline = CubicSpline::new(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(10.0, 20.0),
            WorldPoint::new(20.0, 20.0),
            WorldPoint::new(30.0, 0.0),
        );
        assert_eq!(spline.value_at(0.0), WorldPoint::new(0.0, 0.0));
        assert_eq!(spline.value_at(1.0), WorldPoint::new(30.0, 0.0));
        assert!((spline.value_at(0.5) - WorldPoint::new(15.0, 15.0)).length() < 1e-4);
    }

    #[test]
    fn test_polygon_winding() {
        let square = vec![
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(4.0, 0.0),
            WorldPoint::new(4.0, 4.0),
            WorldPoint::new(0.0, 4.0),
        ];
        let ccw = PolygonFill::new(square.clone(), FillStyle::default());
        let cw = PolygonFill::new(square.into_iter().rev().collect(), FillStyle::default());

        for fill in [&ccw, &cw] {
            assert_eq!(fill.half_planes().len(), 4);
            assert!(fill.contains(WorldPoint::new(2.0, 2.0)));
            assert!(fill.contains(WorldPoint::new(4.0, 4.0)));
            assert!(!fill.contains(WorldPoint::new(5.0, 2.0)));
        }
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = PolygonFill::new(
            vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(1.0, 1.0), WorldPoint::new(2.0, 2.0)],
            FillStyle::default(),
        );
        assert!(line.is_empty());
        assert!(!line.contains(WorldPoint::new(1.0, 1.0)));
    }
}
