use crate::data::prelude::*;

use super::PixelSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointRendererKind {
    Square,
    TiltedSquare,
    Circle,
    CircleAntialiased,
    HollowCircleAntialiased,
}

/// Thickness of the ring drawn by [`PointRendererKind::HollowCircleAntialiased`].
const RING_THICKNESS: f32 = 2.0;

impl PointRendererKind {
    pub const ALL: [PointRendererKind; 5] = [
        Self::Square,
        Self::TiltedSquare,
        Self::Circle,
        Self::CircleAntialiased,
        Self::HollowCircleAntialiased,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::TiltedSquare => "tilted-square",
            Self::Circle => "circle",
            Self::CircleAntialiased => "circle-aa",
            Self::HollowCircleAntialiased => "hollow-circle-aa",
        }
    }

    pub fn render(&self, point: &PointPrimitive, sink: &mut dyn PixelSink) {
        self.stamp(point.position, point.style.size, sink)
    }

    /// Stamps a `size` pixel wide mark centered on `center`. `size <= 0` draws nothing.
    pub fn stamp(&self, center: PixelPoint, size: i32, sink: &mut dyn PixelSink) {
        if size <= 0 {
            return;
        }

        match self {
            Self::Square => stamp_square(center, size, sink),
            Self::TiltedSquare => stamp_tilted_square(center, size, sink),
            Self::Circle => stamp_circle(center, size, sink),
            Self::CircleAntialiased => stamp_circle_antialiased(center, size, None, sink),
            Self::HollowCircleAntialiased => {
                let inner = size as f32 / 2.0 - RING_THICKNESS;
                stamp_circle_antialiased(center, size, Some(inner), sink)
            }
        }
    }
}

fn stamp_square(center: PixelPoint, size: i32, sink: &mut dyn PixelSink) {
    for dy in -size / 2..size - size / 2 {
        for dx in -size / 2..size - size / 2 {
            sink.plot_pixel(center.x + dx, center.y + dy);
        }
    }
}

/// Diamond: Manhattan distance from the center within half the size.
fn stamp_tilted_square(center: PixelPoint, size: i32, sink: &mut dyn PixelSink) {
    let half = size as f32 / 2.0;
    let reach = size / 2;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if (dx.abs() + dy.abs()) as f32 <= half {
                sink.plot_pixel(center.x + dx, center.y + dy);
            }
        }
    }
}

/// Plots `(dx, dy)` mirrored into all four quadrants, without repeating pixels on the axes.
fn plot_mirrored(center: PixelPoint, dx: i32, dy: i32, alpha: Option<f32>, sink: &mut dyn PixelSink) {
    let mut plot = |x: i32, y: i32| match alpha {
        Some(alpha) => sink.plot_pixel_alpha(center.x + x, center.y + y, alpha),
        None => sink.plot_pixel(center.x + x, center.y + y),
    };

    plot(dx, dy);
    if dx != 0 {
        plot(-dx, dy);
    }
    if dy != 0 {
        plot(dx, -dy);
    }
    if dx != 0 && dy != 0 {
        plot(-dx, -dy);
    }
}

/// Euclidean distance within half the size, one quadrant computed and mirrored.
fn stamp_circle(center: PixelPoint, size: i32, sink: &mut dyn PixelSink) {
    let half = size as f32 / 2.0;
    let reach = size / 2;
    for dy in 0..=reach {
        for dx in 0..=reach {
            if ((dx * dx + dy * dy) as f32).sqrt() <= half {
                plot_mirrored(center, dx, dy, None, sink);
            }
        }
    }
}

/// Coverage `1 - (distance - (radius - 0.5))`: pixels whose center is half a pixel inside the
/// edge are opaque, fading to nothing half a pixel outside. With `inner` set, a second ramp
/// cuts the disc down to a ring.
fn stamp_circle_antialiased(center: PixelPoint, size: i32, inner: Option<f32>, sink: &mut dyn PixelSink) {
    let radius = size as f32 / 2.0;
    let reach = radius.ceil() as i32 + 1;
    for dy in 0..=reach {
        for dx in 0..=reach {
            let distance = ((dx * dx + dy * dy) as f32).sqrt();
            let mut alpha = (1.0 - (distance - (radius - 0.5))).clamp(0.0, 1.0);
            if let Some(inner) = inner {
                alpha *= (distance - (inner - 0.5)).clamp(0.0, 1.0);
            }

            if alpha > 0.0 {
                plot_mirrored(center, dx, dy, Some(alpha), sink);
            }
        }
    }
}

#[cfg(test)]
mod test_point {
    use super::*;
    use crate::renderer::PixelRecorder;

    fn stamp(kind: PointRendererKind, size: i32) -> PixelRecorder {
        let mut recorder = PixelRecorder::new();
        kind.stamp(PixelPoint::new(10, 10), size, &mut recorder);
        recorder
    }

    #[test]
    fn test_empty_for_non_positive_size() {
        for kind in PointRendererKind::ALL {
            assert!(stamp(kind, 0).is_empty());
            assert!(stamp(kind, -4).is_empty());
        }
    }

    #[test]
    fn test_square() {
        let odd = stamp(PointRendererKind::Square, 3);
        assert_eq!(odd.len(), 9);
        assert_eq!(odd.point_set().len(), 9);
        assert!(odd.point_set().contains(&PixelPoint::new(9, 11)));

        let even = stamp(PointRendererKind::Square, 4);
        assert_eq!(even.len(), 16);
        assert!(even.point_set().contains(&PixelPoint::new(8, 8)));
        assert!(!even.point_set().contains(&PixelPoint::new(12, 12)));
    }

    #[test]
    fn test_tilted_square() {
        let diamond = stamp(PointRendererKind::TiltedSquare, 5).point_set();
        assert_eq!(diamond.len(), 13);
        assert!(diamond.contains(&PixelPoint::new(12, 10)));
        assert!(!diamond.contains(&PixelPoint::new(12, 11)));

        assert_eq!(stamp(PointRendererKind::TiltedSquare, 1).len(), 1);
    }

    #[test]
    fn test_circle_has_no_duplicates() {
        let circle = stamp(PointRendererKind::Circle, 7);
        assert_eq!(circle.len(), circle.point_set().len());
        assert!(circle.point_set().contains(&PixelPoint::new(13, 10)));
        assert!(!circle.point_set().contains(&PixelPoint::new(13, 13)));
        // four-way symmetric
        for p in circle.point_set() {
            assert!(circle.point_set().contains(&PixelPoint::new(20 - p.x, p.y)));
            assert!(circle.point_set().contains(&PixelPoint::new(p.x, 20 - p.y)));
        }
    }

    #[test]
    fn test_circle_antialiased() {
        let circle = stamp(PointRendererKind::CircleAntialiased, 6);
        assert_eq!(circle.coverage(10, 10), Some(1.0));
        // distance 3 on a radius 3 disc sits half in, half out
        assert!((circle.coverage(13, 10).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(circle.coverage(14, 10), None);
    }

    #[test]
    fn test_hollow_circle() {
        let ring = stamp(PointRendererKind::HollowCircleAntialiased, 10);
        assert_eq!(ring.coverage(10, 10), None);
        assert!(ring.coverage(14, 10).unwrap() > 0.9);
        assert!(ring.coverage(15, 10).is_some());
        assert_eq!(ring.coverage(12, 10), None);
    }
}
