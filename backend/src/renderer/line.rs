//! Line scan conversion, from the naive slope-intercept form up to antialiased Bresenham.
//!
//! The weaker algorithms are kept on purpose so their artifacts can be compared side by side:
//! [`LineRendererKind::SlopeIntercept`] leaves gaps on steep lines, and the orthogonal and
//! 45-degree renderers only make sense for their own kind of segment.

use crate::data::prelude::*;

use super::PixelSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRendererKind {
    Orthogonal,
    Diagonal,
    SlopeIntercept,
    SlopeInterceptExtended,
    Dda,
    BresenhamFirstOctant,
    Bresenham,
    BresenhamBreadth,
    BresenhamBreadthAntialiased,
}

impl LineRendererKind {
    pub const ALL: [LineRendererKind; 9] = [
        Self::Orthogonal,
        Self::Diagonal,
        Self::SlopeIntercept,
        Self::SlopeInterceptExtended,
        Self::Dda,
        Self::BresenhamFirstOctant,
        Self::Bresenham,
        Self::BresenhamBreadth,
        Self::BresenhamBreadthAntialiased,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Diagonal => "diagonal",
            Self::SlopeIntercept => "slope-intercept",
            Self::SlopeInterceptExtended => "slope-intercept-extended",
            Self::Dda => "dda",
            Self::BresenhamFirstOctant => "bresenham-first-octant",
            Self::Bresenham => "bresenham",
            Self::BresenhamBreadth => "bresenham-breadth",
            Self::BresenhamBreadthAntialiased => "bresenham-breadth-aa",
        }
    }

    /// Whether the renderer reads `LineStyle::breadth`.
    pub fn uses_breadth(&self) -> bool {
        matches!(self, Self::BresenhamBreadth | Self::BresenhamBreadthAntialiased)
    }

    pub fn render(&self, segment: &LineSegment, sink: &mut dyn PixelSink) {
        match self {
            Self::Orthogonal => render_orthogonal(segment, sink),
            Self::Diagonal => render_diagonal(segment, sink),
            Self::SlopeIntercept => render_slope_intercept(segment, sink),
            Self::SlopeInterceptExtended => render_slope_intercept_extended(segment, sink),
            Self::Dda => render_dda(segment, sink),
            Self::BresenhamFirstOctant => render_bresenham_first_octant(segment, sink),
            Self::Bresenham => render_bresenham(segment, sink),
            Self::BresenhamBreadth => render_bresenham_breadth(segment, sink),
            Self::BresenhamBreadthAntialiased => render_bresenham_breadth_antialiased(segment, sink),
        }
    }
}

/// Only correct for horizontal or vertical input. Anything else is drawn as if it were
/// horizontal at the start row.
pub fn render_orthogonal(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let (start, end) = (segment.start, segment.end);
    if segment.is_vertical() {
        for y in start.y.min(end.y)..=start.y.max(end.y) {
            sink.plot_pixel(start.x, y);
        }
    } else {
        for x in start.x.min(end.x)..=start.x.max(end.x) {
            sink.plot_pixel(x, start.y);
        }
    }
}

/// Only correct for slope exactly +-1, steps both axes once per pixel along the x extent.
pub fn render_diagonal(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let (sx, sy) = (segment.dx().signum(), segment.dy().signum());
    let (x0, y0) = (segment.start.x as i64, segment.start.y as i64);
    for i in 0..=segment.dx().abs() {
        sink.plot_pixel((x0 + i * sx) as i32, (y0 + i * sy) as i32);
    }
}

/// `y = round(slope * x + b)` for every column. Steep lines come out dotted; vertical ones
/// collapse to their two end points.
pub fn render_slope_intercept(segment: &LineSegment, sink: &mut dyn PixelSink) {
    if segment.is_vertical() {
        sink.plot_pixel(segment.start.x, segment.start.y);
        if !segment.is_degenerate() {
            sink.plot_pixel(segment.end.x, segment.end.y);
        }
        return;
    }

    let (slope, intercept) = (segment.slope(), segment.y_intercept());
    for x in segment.leftmost().x..=segment.rightmost().x {
        sink.plot_pixel(x, (slope * x as f64 + intercept).round() as i32);
    }
}

/// Slope-intercept that steps along y when the line is steep.
pub fn render_slope_intercept_extended(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let (dx, dy) = (segment.dx(), segment.dy());
    if segment.is_degenerate() {
        sink.plot_pixel(segment.start.x, segment.start.y);
    } else if dy.abs() < dx.abs() {
        render_slope_intercept(segment, sink);
    } else {
        let inverse_slope = dx as f64 / dy as f64;
        let intercept = segment.x_intercept();
        for y in segment.bottommost().y..=segment.topmost().y {
            sink.plot_pixel((inverse_slope * y as f64 + intercept).round() as i32, y);
        }
    }
}

/// Digital differential analyzer: `max(|dx|, |dy|) + 1` samples, each floored.
pub fn render_dda(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let (dx, dy) = (segment.dx() as f64, segment.dy() as f64);
    let steps = segment.dx().abs().max(segment.dy().abs());
    if steps == 0 {
        sink.plot_pixel(segment.start.x, segment.start.y);
        return;
    }

    let (x0, y0) = (segment.start.x as f64, segment.start.y as f64);
    for i in 0..=steps {
        // computed from i rather than accumulated, so the last sample lands exactly on the end
        let t = i as f64 / steps as f64;
        sink.plot_pixel((x0 + dx * t).floor() as i32, (y0 + dy * t).floor() as i32);
    }
}

/// Textbook integer Bresenham, valid for `0 <= dy <= dx` only.
pub fn render_bresenham_first_octant(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let (dx, dy) = (segment.dx(), segment.dy());
    let mut err = 2 * dy - dx;
    let mut y = segment.start.y as i64;

    for x in segment.start.x..=segment.end.x {
        sink.plot_pixel(x, y as i32);
        if err > 0 {
            y += 1;
            err -= 2 * dx;
        }
        err += 2 * dy;
    }
}

/// One step of a [`BresenhamWalk`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BresenhamStep {
    pub pixel: PixelPoint,
    /// Ideal minor-axis position minus the plotted one, in `[-0.5, 0.5]`, measured along
    /// the positive minor axis.
    pub offset: f32,
}

/// All-octant Bresenham as an iterator.
///
/// The segment is first normalized so the major axis is x (swapping axes for steep lines) and
/// runs in increasing order. That makes the walk of `a -> b` and `b -> a` identical, and
/// leaves first-octant input untouched. The walk runs in `i64`, so end points anywhere in
/// the `i32` range neither overflow the error term nor step past the last pixel.
#[derive(Debug, Clone)]
pub struct BresenhamWalk {
    steep: bool,
    x: i64,
    end_x: i64,
    y: i64,
    y_step: i64,
    dx: i64,
    dy: i64,
    err: i64,
}

impl BresenhamWalk {
    pub fn new(start: PixelPoint, end: PixelPoint) -> Self {
        let widen = |p: PixelPoint| (p.x as i64, p.y as i64);
        let (start, end) = (widen(start), widen(end));
        let steep = (end.1 - start.1).abs() > (end.0 - start.0).abs();
        let swap = |(x, y): (i64, i64)| if steep { (y, x) } else { (x, y) };
        let (mut a, mut b) = (swap(start), swap(end));
        if a.0 > b.0 {
            std::mem::swap(&mut a, &mut b);
        }

        let dx = b.0 - a.0;
        let dy = (b.1 - a.1).abs();
        Self {
            steep,
            x: a.0,
            end_x: b.0,
            y: a.1,
            y_step: if a.1 < b.1 { 1 } else { -1 },
            dx,
            dy,
            err: 2 * dy - dx,
        }
    }

    /// Unit vector of the minor axis in pixel space.
    pub fn minor_axis(&self) -> PixelVector {
        if self.steep { PixelVector::new(1, 0) } else { PixelVector::new(0, 1) }
    }
}

impl Iterator for BresenhamWalk {
    type Item = BresenhamStep;

    fn next(&mut self) -> Option<BresenhamStep> {
        if self.x > self.end_x {
            return None;
        }

        // err = 2dy(i + 1) - 2dx(y - y0) - dx, so the distance from the ideal line is
        // (err + dx - 2dy) / 2dx, counted in the direction of y_step
        let offset = if self.dx == 0 {
            0.0
        } else {
            (self.err + self.dx - 2 * self.dy) as f32 / (2 * self.dx) as f32 * self.y_step as f32
        };
        // both coordinates lie between the end points here, so they fit in i32
        let (x, y) = (self.x as i32, self.y as i32);
        let pixel = if self.steep { PixelPoint::new(y, x) } else { PixelPoint::new(x, y) };

        if self.err > 0 {
            self.y += self.y_step;
            self.err -= 2 * self.dx;
        }
        self.err += 2 * self.dy;
        self.x += 1;

        Some(BresenhamStep { pixel, offset })
    }
}

pub fn render_bresenham(segment: &LineSegment, sink: &mut dyn PixelSink) {
    for step in BresenhamWalk::new(segment.start, segment.end) {
        sink.plot_pixel(step.pixel.x, step.pixel.y);
    }
}

/// `round(breadth)` as a pixel count, `None` when nothing should be drawn.
fn pixel_width(breadth: f32) -> Option<i32> {
    let width = breadth.round();
    if width.is_finite() && width >= 1.0 { Some(width as i32) } else { None }
}

/// Parallel 1px Bresenham passes offset along the minor axis by `-w/2 .. w - w/2`.
/// Even widths therefore lean towards the negative side.
pub fn render_bresenham_breadth(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let Some(width) = pixel_width(segment.style.breadth) else {
        return;
    };

    let minor = BresenhamWalk::new(segment.start, segment.end).minor_axis();
    for offset in -width / 2..width - width / 2 {
        let pass = segment.translated(minor * offset);
        render_bresenham(&pass, sink);
    }
}

/// The breadth passes plus one partially covered pass on each side.
///
/// Coverage of the outer passes comes from the Bresenham error term, so it varies
/// continuously as the ideal line slides between pixel rows.
pub fn render_bresenham_breadth_antialiased(segment: &LineSegment, sink: &mut dyn PixelSink) {
    let Some(width) = pixel_width(segment.style.breadth) else {
        return;
    };

    render_bresenham_breadth(segment, sink);

    let minor = BresenhamWalk::new(segment.start, segment.end).minor_axis();
    let (low, high) = (minor * (-width / 2 - 1), minor * (width - width / 2));
    for step in BresenhamWalk::new(segment.start, segment.end) {
        let below = (-step.offset).clamp(0.0, 1.0);
        let above = step.offset.clamp(0.0, 1.0);

        let p = offset_pixel(step.pixel, low);
        sink.plot_pixel_alpha(p.x, p.y, below);
        let p = offset_pixel(step.pixel, high);
        sink.plot_pixel_alpha(p.x, p.y, above);
    }
}
