pub mod color;
pub mod dirty_flag;
pub mod primitive;
pub mod transform;

use lyon::geom::euclid;

pub mod prelude {
    pub use super::color::{ Color, Rgba8 };
    pub use super::dirty_flag::DirtyFlag;
    pub use super::primitive::*;
    pub use super::transform::{ Transform2D, Transform2DStack };

    /// Integer raster coordinates, the space every rasterizer writes into.
    pub struct PixelSpace;
    pub type PixelPoint = super::euclid::Point2D<i32, PixelSpace>;
    pub type PixelVector = super::euclid::Vector2D<i32, PixelSpace>;

    /// Continuous coordinates objects are modelled in.
    pub struct WorldSpace;
    pub type WorldPoint = super::euclid::Point2D<f32, WorldSpace>;
    pub type WorldVector = super::euclid::Vector2D<f32, WorldSpace>;
    pub type WorldRect = super::euclid::Box2D<f32, WorldSpace>;

    /// Snaps a world position onto the pixel grid, pixel centers sit on integers.
    pub fn to_pixel(point: WorldPoint) -> PixelPoint {
        PixelPoint::new(point.x.round() as i32, point.y.round() as i32)
    }

    pub fn to_world(pixel: PixelPoint) -> WorldPoint {
        WorldPoint::new(pixel.x as f32, pixel.y as f32)
    }

    /// Inclusive overlap test, degenerate (zero-area) rects still overlap when they touch.
    pub fn rects_overlap(a: &WorldRect, b: &WorldRect) -> bool {
        a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.y <= b.max.y && a.max.y >= b.min.y
    }

    pub fn bounding_rect<'a, I: IntoIterator<Item = &'a WorldPoint>>(points: I) -> Option<WorldRect> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(WorldRect::new(first, first), |rect, p| {
            WorldRect::new(rect.min.min(*p), rect.max.max(*p))
        }))
    }
}
