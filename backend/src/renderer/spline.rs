use crate::data::prelude::*;

use super::{ line, point::PointRendererKind, PixelSink };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplineRendererKind {
    /// Every flattened pixel, 1px wide.
    AdaptiveStep,
    /// An antialiased disc of the spline's breadth on every flattened pixel.
    AdaptiveStepBreadth,
    /// Fixed subdivision joined by Bresenham lines.
    Subdivided,
}

impl SplineRendererKind {
    pub const ALL: [SplineRendererKind; 3] = [Self::AdaptiveStep, Self::AdaptiveStepBreadth, Self::Subdivided];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AdaptiveStep => "adaptive-step",
            Self::AdaptiveStepBreadth => "adaptive-step-breadth",
            Self::Subdivided => "subdivided",
        }
    }

    pub fn render(&self, primitive: &SplinePrimitive, sink: &mut dyn PixelSink) {
        let spline = &primitive.spline;
        match self {
            Self::AdaptiveStep => {
                flatten(spline, |p| sink.plot_pixel(p.x, p.y));
            }
            Self::AdaptiveStepBreadth => {
                let size = primitive.style.breadth.round();
                if size.is_finite() && size >= 1.0 {
                    flatten(spline, |p| PointRendererKind::CircleAntialiased.stamp(p, size as i32, &mut *sink));
                }
            }
            Self::Subdivided => render_subdivided(spline, sink),
        }
    }
}

pub const INITIAL_STEP: f64 = 0.001;
/// Below this step a sample is accepted even if it jumps more than a pixel.
pub const MIN_STEP: f64 = 1e-6;

/// Counters from one [`flatten`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlattenStats {
    /// Curve evaluations, including rejected ones.
    pub samples: u64,
    pub plotted: u64,
    /// A non-finite sample cut the walk short.
    pub interrupted: bool,
}

/// Walks `t` over `[0, 1]` with a variable step and reports each newly reached pixel once.
///
/// A sample that stays on the last pixel doubles the step, one that lands farther than a pixel
/// away (squared distance above 1) is retried with half the step until [`MIN_STEP`].
/// A NaN (or infinite) sample stops the walk.
pub fn flatten(spline: &CubicSpline, mut plot: impl FnMut(PixelPoint)) -> FlattenStats {
    let mut stats = FlattenStats::default();
    let sample = |t: f64, stats: &mut FlattenStats| {
        stats.samples += 1;
        let p = spline.value_at(t as f32);
        if p.x.is_finite() && p.y.is_finite() { Some(to_pixel(p)) } else { None }
    };

    let Some(mut last) = sample(0.0, &mut stats) else {
        stats.interrupted = true;
        return stats;
    };
    plot(last);
    stats.plotted += 1;

    let mut t = 0.0;
    let mut step = INITIAL_STEP;
    while t < 1.0 {
        let next_t = (t + step).min(1.0);
        let Some(p) = sample(next_t, &mut stats) else {
            log::debug!("spline flattening stopped at t = {} by a non-finite sample", next_t);
            stats.interrupted = true;
            break;
        };

        let distance = (p.x as i64 - last.x as i64).pow(2) + (p.y as i64 - last.y as i64).pow(2);
        if distance == 0 {
            t = next_t;
            step *= 2.0;
        } else if distance > 1 && step > MIN_STEP {
            step = (step / 2.0).max(MIN_STEP);
        } else {
            plot(p);
            stats.plotted += 1;
            last = p;
            t = next_t;
        }
    }

    stats
}

pub const PIXELS_PER_SUBDIVISION: f32 = 10.0;
pub const LENGTH_TOLERANCE: f32 = 1.0;

/// Number of uniform parameter steps used by [`SplineRendererKind::Subdivided`].
pub fn subdivision_count(spline: &CubicSpline) -> u32 {
    let count = (spline.approximate_length(LENGTH_TOLERANCE) / PIXELS_PER_SUBDIVISION).max(1.0);
    if count.is_finite() { count as u32 } else { 1 }
}

fn render_subdivided(spline: &CubicSpline, sink: &mut dyn PixelSink) {
    if !spline.is_finite() {
        return;
    }

    let count = subdivision_count(spline);
    let mut previous = to_pixel(spline.value_at(0.0));
    for i in 1..=count {
        let next = to_pixel(spline.value_at(i as f32 / count as f32));
        // the shared end point of consecutive chords is plotted twice, harmless on a canvas
        line::render_bresenham(&LineSegment::new(previous, next, LineStyle::default()), sink);
        previous = next;
    }
}

#[cfg(test)]
mod test_spline {
    use super::*;
    use crate::renderer::PixelRecorder;

    fn arch() -> CubicSpline {
        CubicSpline::new(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(20.0, 60.0),
            WorldPoint::new(60.0, 60.0),
            WorldPoint::new(80.0, 0.0),
        )
    }

    #[test]
    fn test_flatten_is_gap_free() {
        let mut points = Vec::new();
        let stats = flatten(&arch(), |p| points.push(p));

        assert!(!stats.interrupted);
        assert!(stats.samples < 2_000_000);
        assert_eq!(points.first(), Some(&PixelPoint::new(0, 0)));
        assert_eq!(points.last(), Some(&PixelPoint::new(80, 0)));
        for pair in points.windows(2) {
            let d = (pair[1] - pair[0]).square_length();
            assert!(d >= 1 && d <= 2, "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_flatten_degenerate_point() {
        let p = WorldPoint::new(3.0, 4.0);
        let mut points = Vec::new();
        let stats = flatten(&CubicSpline::new(p, p, p, p), |p| points.push(p));
        assert_eq!(points, vec![PixelPoint::new(3, 4)]);
        // doubling gets through an unmoving curve quickly
        assert!(stats.samples < 64);
    }

    #[test]
    fn test_flatten_stops_on_nan() {
        let nan = WorldPoint::new(f32::NAN, 0.0);
        let spline = CubicSpline::new(nan, nan, WorldPoint::new(1.0, 1.0), WorldPoint::new(2.0, 2.0));
        let mut recorder = PixelRecorder::new();
        SplineRendererKind::AdaptiveStep.render(&SplinePrimitive::new(spline, SplineStyle::default()), &mut recorder);
        assert!(recorder.is_empty());

        let stats = flatten(&spline, |_| {});
        assert!(stats.interrupted);
    }

    #[test]
    fn test_breadth_variant() {
        let mut style = SplineStyle::default();
        style.breadth = 5.0;
        let mut wide = PixelRecorder::new();
        SplineRendererKind::AdaptiveStepBreadth.render(&SplinePrimitive::new(arch(), style), &mut wide);

        let mut thin = PixelRecorder::new();
        SplineRendererKind::AdaptiveStep.render(&SplinePrimitive::new(arch(), style), &mut thin);
        assert!(wide.point_set().is_superset(&thin.point_set()));
        assert!(wide.point_set().len() > thin.point_set().len() * 2);

        style.breadth = 0.0;
        let mut none = PixelRecorder::new();
        SplineRendererKind::AdaptiveStepBreadth.render(&SplinePrimitive::new(arch(), style), &mut none);
        assert!(none.is_empty());
    }

    #[test]
    fn test_subdivided() {
        let spline = arch();
        assert!(subdivision_count(&spline) >= 10);

        let mut recorder = PixelRecorder::new();
        SplineRendererKind::Subdivided.render(&SplinePrimitive::new(spline, SplineStyle::default()), &mut recorder);
        let set = recorder.point_set();
        assert!(set.contains(&PixelPoint::new(0, 0)));
        assert!(set.contains(&PixelPoint::new(80, 0)));
    }
}
