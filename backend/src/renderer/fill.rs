use crate::data::prelude::*;

use super::PixelSink;

/// Fills a convex polygon by testing every pixel of its bounding box against every edge's
/// half-plane. `O(pixels * edges)`, meant as a reference rather than a scanline fill.
pub fn render_convexity_test(polygon: &PolygonFill, sink: &mut dyn PixelSink) {
    if polygon.is_empty() {
        return;
    }
    let Some(bounds) = bounding_rect(polygon.vertices()) else {
        return;
    };
    if !(bounds.min.x.is_finite() && bounds.min.y.is_finite() && bounds.max.x.is_finite() && bounds.max.y.is_finite()) {
        return;
    }

    let (min_x, min_y) = (bounds.min.x.floor() as i32, bounds.min.y.floor() as i32);
    let (max_x, max_y) = (bounds.max.x.ceil() as i32, bounds.max.y.ceil() as i32);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if polygon.contains(to_world(PixelPoint::new(x, y))) {
                sink.plot_pixel(x, y);
            }
        }
    }
}

#[cfg(test)]
mod test_fill {
    use super::*;
    use crate::renderer::PixelRecorder;

    fn fill(vertices: &[(f32, f32)]) -> PixelRecorder {
        let polygon = PolygonFill::new(
            vertices.iter().map(|&(x, y)| WorldPoint::new(x, y)).collect(),
            FillStyle::default(),
        );
        let mut recorder = PixelRecorder::new();
        render_convexity_test(&polygon, &mut recorder);
        recorder
    }

    #[test]
    fn test_square_includes_boundary() {
        let square = fill(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert_eq!(square.len(), 121);
        assert_eq!(square.point_set().len(), 121);
    }

    #[test]
    fn test_triangle() {
        let triangle = fill(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)]);
        // x + y <= 4 over the non-negative quadrant
        assert_eq!(triangle.len(), 15);
        assert!(triangle.point_set().contains(&PixelPoint::new(2, 2)));
        assert!(!triangle.point_set().contains(&PixelPoint::new(3, 2)));
    }

    #[test]
    fn test_clockwise_winding() {
        let square = fill(&[(0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]);
        assert_eq!(square.len(), 121);
    }

    #[test]
    fn test_degenerate_is_empty() {
        assert!(fill(&[(0.0, 0.0), (5.0, 5.0)]).is_empty());
        assert!(fill(&[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]).is_empty());
        assert!(fill(&[]).is_empty());
    }
}
