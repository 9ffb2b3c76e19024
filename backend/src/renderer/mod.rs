//! Scan conversion: every rasterizer turns one primitive into calls on a [`PixelSink`].
//!
//! Rasterizers are pure functions of `(primitive, sink)`. They never fail for finite input,
//! coordinates outside the target are the sink's business.

pub mod canvas;
pub mod fill;
pub mod line;
pub mod point;
pub mod spline;

use crate::data::prelude::*;

use line::LineRendererKind;
use point::PointRendererKind;
use spline::SplineRendererKind;

pub trait PixelSink {
    fn plot_pixel(&mut self, x: i32, y: i32);

    /// Partial coverage write. Sinks that cannot blend plot the pixel opaque.
    fn plot_pixel_alpha(&mut self, x: i32, y: i32, alpha: f32) {
        let _ = alpha;
        self.plot_pixel(x, y)
    }
}

impl<S: PixelSink + ?Sized> PixelSink for &mut S {
    fn plot_pixel(&mut self, x: i32, y: i32) {
        (**self).plot_pixel(x, y)
    }

    fn plot_pixel_alpha(&mut self, x: i32, y: i32, alpha: f32) {
        (**self).plot_pixel_alpha(x, y, alpha)
    }
}

/// Records every write in order, opaque writes carry an alpha of `1.0`.
#[derive(Debug, Default, Clone)]
pub struct PixelRecorder {
    pub pixels: Vec<(i32, i32, f32)>,
}

impl PixelRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn points(&self) -> Vec<PixelPoint> {
        self.pixels.iter().map(|&(x, y, _)| PixelPoint::new(x, y)).collect()
    }

    pub fn point_set(&self) -> std::collections::HashSet<PixelPoint> {
        self.pixels.iter().map(|&(x, y, _)| PixelPoint::new(x, y)).collect()
    }

    /// Highest coverage written to `(x, y)`, if it was written at all.
    pub fn coverage(&self, x: i32, y: i32) -> Option<f32> {
        self.pixels
            .iter()
            .filter(|&&(px, py, _)| px == x && py == y)
            .map(|&(_, _, alpha)| alpha)
            .fold(None, |best, alpha| Some(best.map_or(alpha, |b: f32| b.max(alpha))))
    }
}

impl PixelSink for PixelRecorder {
    fn plot_pixel(&mut self, x: i32, y: i32) {
        self.pixels.push((x, y, 1.0));
    }

    fn plot_pixel_alpha(&mut self, x: i32, y: i32, alpha: f32) {
        self.pixels.push((x, y, alpha));
    }
}

/// The closed set of rasterizers, built once and handed to whoever needs to list or look
/// them up by name (settings files, pickers).
#[derive(Debug, Clone)]
pub struct RendererRegistry {
    lines: Vec<LineRendererKind>,
    points: Vec<PointRendererKind>,
    splines: Vec<SplineRendererKind>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self {
            lines: LineRendererKind::ALL.to_vec(),
            points: PointRendererKind::ALL.to_vec(),
            splines: SplineRendererKind::ALL.to_vec(),
        }
    }

    pub fn lines(&self) -> &[LineRendererKind] {
        &self.lines
    }

    pub fn points(&self) -> &[PointRendererKind] {
        &self.points
    }

    pub fn splines(&self) -> &[SplineRendererKind] {
        &self.splines
    }

    pub fn line(&self, name: &str) -> Option<LineRendererKind> {
        self.lines.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn point(&self, name: &str) -> Option<PointRendererKind> {
        self.points.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn spline(&self, name: &str) -> Option<SplineRendererKind> {
        self.splines.iter().copied().find(|kind| kind.name() == name)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test_registry {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let registry = RendererRegistry::new();
        assert_eq!(registry.lines().len(), LineRendererKind::ALL.len());
        for kind in registry.lines() {
            assert_eq!(registry.line(kind.name()), Some(*kind));
        }
        for kind in registry.points() {
            assert_eq!(registry.point(kind.name()), Some(*kind));
        }
        for kind in registry.splines() {
            assert_eq!(registry.spline(kind.name()), Some(*kind));
        }
        assert_eq!(registry.line("no-such-renderer"), None);
    }

    #[test]
    fn test_recorder_coverage() {
        let mut recorder = PixelRecorder::new();
        recorder.plot_pixel(1, 1);
        recorder.plot_pixel_alpha(2, 1, 0.25);
        recorder.plot_pixel_alpha(2, 1, 0.5);

        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.coverage(1, 1), Some(1.0));
        assert_eq!(recorder.coverage(2, 1), Some(0.5));
        assert_eq!(recorder.coverage(3, 1), None);
        assert_eq!(recorder.point_set().len(), 2);
    }
}
