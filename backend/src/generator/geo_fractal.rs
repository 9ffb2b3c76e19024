use std::collections::VecDeque;

use crate::data::prelude::*;

use super::{ CancellationToken, FractalShape };

/// What one expansion of a geometry produced.
#[derive(Debug, Clone)]
pub struct Expansion<G> {
    /// Shapes that are final as soon as they are produced.
    pub output: Vec<FractalShape>,
    /// Geometry of the next generation, in drawing order.
    pub next: Vec<G>,
}

/// A recursive geometric substitution system.
pub trait GeoFractal {
    type Geometry;

    fn initial_geometry(&self) -> Vec<Self::Geometry>;

    /// `index` is the geometry's position among its siblings.
    fn step(&self, geometry: &Self::Geometry, depth: u32, index: usize) -> Expansion<Self::Geometry>;

    /// The shapes a still pending geometry stands for when expansion stops.
    fn output(&self, geometry: &Self::Geometry) -> Vec<FractalShape>;

    /// Conservative cull test: `false` only when nothing grown out of `geometry` can reach
    /// `viewport`.
    fn filter(&self, geometry: &Self::Geometry, depth: u32, index: usize, viewport: &WorldRect) -> bool {
        let _ = (geometry, depth, index, viewport);
        true
    }
}

fn overlaps(points: &[WorldPoint], viewport: &WorldRect) -> bool {
    bounding_rect(points.iter()).map_or(false, |rect| rects_overlap(&rect, viewport))
}

fn rotated(v: WorldVector, radians: f32) -> WorldVector {
    let (sin, cos) = radians.sin_cos();
    WorldVector::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[derive(Debug, Clone, Copy)]
pub struct SierpinskiTriangle {
    pub corners: [WorldPoint; 3],
}

impl GeoFractal for SierpinskiTriangle {
    type Geometry = [WorldPoint; 3];

    fn initial_geometry(&self) -> Vec<Self::Geometry> {
        vec![self.corners]
    }

    fn step(&self, &[a, b, c]: &Self::Geometry, _depth: u32, _index: usize) -> Expansion<Self::Geometry> {
        let (ab, bc, ca) = (a.lerp(b, 0.5), b.lerp(c, 0.5), c.lerp(a, 0.5));
        Expansion { output: Vec::new(), next: vec![[a, ab, ca], [ab, b, bc], [ca, bc, c]] }
    }

    fn output(&self, geometry: &Self::Geometry) -> Vec<FractalShape> {
        vec![FractalShape::Polygon(geometry.to_vec())]
    }

    fn filter(&self, geometry: &Self::Geometry, _depth: u32, _index: usize, viewport: &WorldRect) -> bool {
        overlaps(geometry, viewport)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KochCurve {
    pub from: WorldPoint,
    pub to: WorldPoint,
}

impl GeoFractal for KochCurve {
    type Geometry = (WorldPoint, WorldPoint);

    fn initial_geometry(&self) -> Vec<Self::Geometry> {
        vec![(self.from, self.to)]
    }

    fn step(&self, &(a, b): &Self::Geometry, _depth: u32, _index: usize) -> Expansion<Self::Geometry> {
        let third = (b - a) / 3.0;
        let (p1, p3) = (a + third, a + third * 2.0);
        let peak = p1 + rotated(third, std::f32::consts::FRAC_PI_3);
        Expansion { output: Vec::new(), next: vec![(a, p1), (p1, peak), (peak, p3), (p3, b)] }
    }

    fn output(&self, &(a, b): &Self::Geometry) -> Vec<FractalShape> {
        vec![FractalShape::Line(a, b)]
    }

    fn filter(&self, &(a, b): &Self::Geometry, _depth: u32, _index: usize, viewport: &WorldRect) -> bool {
        // the limit curve stays within sqrt(3) / 6 of the segment's length off its chord
        let margin = (b - a).length() * 0.3;
        bounding_rect([a, b].iter())
            .map_or(false, |rect| rects_overlap(&rect.inflate(margin, margin), viewport))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SierpinskiCarpet {
    /// Lower left corner.
    pub origin: WorldPoint,
    pub size: f32,
}

impl GeoFractal for SierpinskiCarpet {
    type Geometry = (WorldPoint, f32);

    fn initial_geometry(&self) -> Vec<Self::Geometry> {
        vec![(self.origin, self.size)]
    }

    fn step(&self, &(origin, size): &Self::Geometry, _depth: u32, _index: usize) -> Expansion<Self::Geometry> {
        let third = size / 3.0;
        let next = (0..3)
            .flat_map(|row| (0..3).map(move |column| (row, column)))
            .filter(|&cell| cell != (1, 1))
            .map(|(row, column)| (origin + WorldVector::new(column as f32 * third, row as f32 * third), third))
            .collect();
        Expansion { output: Vec::new(), next }
    }

    fn output(&self, &(origin, size): &Self::Geometry) -> Vec<FractalShape> {
        vec![FractalShape::Polygon(vec![
            origin,
            origin + WorldVector::new(size, 0.0),
            origin + WorldVector::new(size, size),
            origin + WorldVector::new(0.0, size),
        ])]
    }

    fn filter(&self, &(origin, size): &Self::Geometry, _depth: u32, _index: usize, viewport: &WorldRect) -> bool {
        rects_overlap(&WorldRect::new(origin, origin + WorldVector::new(size, size)), viewport)
    }
}

/// Heighway dragon: every segment is replaced by two legs of a right angle, folding left and
/// right alternately.
#[derive(Debug, Clone, Copy)]
pub struct DragonCurve {
    pub from: WorldPoint,
    pub to: WorldPoint,
}

impl GeoFractal for DragonCurve {
    /// Segment plus the side (`1.0` or `-1.0`) its corner folds to.
    type Geometry = (WorldPoint, WorldPoint, f32);

    fn initial_geometry(&self) -> Vec<Self::Geometry> {
        vec![(self.from, self.to, 1.0)]
    }

    fn step(&self, &(a, b, side): &Self::Geometry, _depth: u32, _index: usize) -> Expansion<Self::Geometry> {
        let half = (b - a) / 2.0;
        let corner = a + half + WorldVector::new(-half.y, half.x) * side;
        Expansion { output: Vec::new(), next: vec![(a, corner, 1.0), (corner, b, -1.0)] }
    }

    fn output(&self, &(a, b, _): &Self::Geometry) -> Vec<FractalShape> {
        vec![FractalShape::Line(a, b)]
    }

    fn filter(&self, &(a, b, _): &Self::Geometry, _depth: u32, _index: usize, viewport: &WorldRect) -> bool {
        let (center, reach) = (a.lerp(b, 0.5), (b - a).length() * 1.5);
        rects_overlap(&WorldRect::new(center, center).inflate(reach, reach), viewport)
    }
}

/// A square cell of a space-filling curve. The curve enters at `origin`; a Hilbert cell is
/// left at `origin + x`, a Peano cell at the opposite corner `origin + x + y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFrame {
    pub origin: WorldPoint,
    pub x: WorldVector,
    pub y: WorldVector,
}

impl CurveFrame {
    pub fn new(origin: WorldPoint, x: WorldVector, y: WorldVector) -> Self {
        Self { origin, x, y }
    }

    pub fn center(&self) -> WorldPoint {
        self.origin + (self.x + self.y) / 2.0
    }

    fn corners(&self) -> [WorldPoint; 4] {
        [self.origin, self.origin + self.x, self.origin + self.y, self.origin + self.x + self.y]
    }

    fn vertex(&self) -> FractalShape {
        // neighbouring cells sit one side length apart
        let link_distance = self.x.length().max(self.y.length()) * 1.01;
        FractalShape::Vertex { position: self.center(), link_distance }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HilbertCurve {
    pub frame: CurveFrame,
}

impl GeoFractal for HilbertCurve {
    type Geometry = CurveFrame;

    fn initial_geometry(&self) -> Vec<Self::Geometry> {
        vec![self.frame]
    }

    fn step(&self, frame: &Self::Geometry, _depth: u32, _index: usize) -> Expansion<Self::Geometry> {
        let (o, x, y) = (frame.origin, frame.x / 2.0, frame.y / 2.0);
        let next = vec![
            CurveFrame::new(o, y, x),
            CurveFrame::new(o + y, x, y),
            CurveFrame::new(o + x + y, x, y),
            CurveFrame::new(o + x * 2.0 + y, -y, -x),
        ];
        Expansion { output: Vec::new(), next }
    }

    fn output(&self, frame: &Self::Geometry) -> Vec<FractalShape> {
        vec![frame.vertex()]
    }

    fn filter(&self, frame: &Self::Geometry, _depth: u32, _index: usize, viewport: &WorldRect) -> bool {
        overlaps(&frame.corners(), viewport)
    }
}

/// Peano curve, walking the 3x3 cells column by column, up, down, up.
#[derive(Debug, Clone, Copy)]
pub struct PeanoCurve {
    pub frame: CurveFrame,
}

impl GeoFractal for PeanoCurve {
    type Geometry = CurveFrame;

    fn initial_geometry(&self) -> Vec<Self::Geometry> {
        vec![self.frame]
    }

    fn step(&self, frame: &Self::Geometry, _depth: u32, _index: usize) -> Expansion<Self::Geometry> {
        let (x, y) = (frame.x / 3.0, frame.y / 3.0);
        let mut next = Vec::with_capacity(9);
        for column in 0..3 {
            for step in 0..3 {
                let row = if column % 2 == 1 { 2 - step } else { step };
                let mut cell = CurveFrame::new(frame.origin + x * column as f32 + y * row as f32, x, y);
                if row % 2 == 1 {
                    cell.origin += cell.x;
                    cell.x = -cell.x;
                }
                if column % 2 == 1 {
                    cell.origin += cell.y;
                    cell.y = -cell.y;
                }
                next.push(cell);
            }
        }
        Expansion { output: Vec::new(), next }
    }

    fn output(&self, frame: &Self::Geometry) -> Vec<FractalShape> {
        vec![frame.vertex()]
    }

    fn filter(&self, frame: &Self::Geometry, _depth: u32, _index: usize, viewport: &WorldRect) -> bool {
        overlaps(&frame.corners(), viewport)
    }
}

/// Breadth-first driver. Expands generation by generation for `steps` generations and
/// yields shapes lazily, one expansion at a time, so it can be dropped or cancelled
/// between any two expansions.
pub struct RecursiveGeoFractalRenderer<F: GeoFractal> {
    fractal: F,
    steps: u32,
    final_step_as_output: bool,
    viewport: Option<WorldRect>,
    cancel: Option<CancellationToken>,

    pending: VecDeque<(F::Geometry, u32, usize)>,
    output: VecDeque<FractalShape>,
    expansions: u64,
}

impl<F: GeoFractal> RecursiveGeoFractalRenderer<F> {
    pub fn new(fractal: F, steps: u32) -> Self {
        let pending = fractal.initial_geometry().into_iter().enumerate().map(|(i, g)| (g, 0, i)).collect();
        Self {
            fractal,
            steps,
            final_step_as_output: true,
            viewport: None,
            cancel: None,
            pending,
            output: VecDeque::new(),
            expansions: 0,
        }
    }

    /// Whether the last generation is emitted through [`GeoFractal::output`]. On by default.
    pub fn final_step_as_output(mut self, enabled: bool) -> Self {
        self.final_step_as_output = enabled;
        self
    }

    pub fn with_viewport(mut self, viewport: WorldRect) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Geometries expanded or emitted so far, culled ones excluded.
    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    fn expand_next(&mut self) -> bool {
        let Some((geometry, depth, index)) = self.pending.pop_front() else {
            return false;
        };

        if let Some(viewport) = &self.viewport {
            if !self.fractal.filter(&geometry, depth, index, viewport) {
                return true;
            }
        }

        self.expansions += 1;
        if depth < self.steps {
            let expansion = self.fractal.step(&geometry, depth, index);
            self.output.extend(expansion.output);
            self.pending.extend(expansion.next.into_iter().enumerate().map(|(i, g)| (g, depth + 1, i)));
        } else if self.final_step_as_output {
            self.output.extend(self.fractal.output(&geometry));
        }
        true
    }
}

impl<F: GeoFractal> Iterator for RecursiveGeoFractalRenderer<F> {
    type Item = FractalShape;

    fn next(&mut self) -> Option<FractalShape> {
        loop {
            if let Some(shape) = self.output.pop_front() {
                return Some(shape);
            }
            if self.cancel.as_ref().map_or(false, CancellationToken::is_cancelled) {
                log::debug!("fractal expansion cancelled after {} expansions", self.expansions);
                self.pending.clear();
                return None;
            }
            if !self.expand_next() {
                return None;
            }
        }
    }
}

/// Turns consecutive curve vertices into segments. Vertices further apart than their
/// `link_distance` (a culled stretch of the curve in between) are not joined. Other shapes
/// pass through untouched.
pub struct VertexJoiner<I> {
    inner: I,
    last: Option<WorldPoint>,
}

impl<I: Iterator<Item = FractalShape>> VertexJoiner<I> {
    pub fn new(inner: I) -> Self {
        Self { inner, last: None }
    }
}

impl<I: Iterator<Item = FractalShape>> Iterator for VertexJoiner<I> {
    type Item = FractalShape;

    fn next(&mut self) -> Option<FractalShape> {
        loop {
            match self.inner.next()? {
                FractalShape::Vertex { position, link_distance } => {
                    if let Some(last) = self.last.replace(position) {
                        if (position - last).length() <= link_distance {
                            return Some(FractalShape::Line(last, position));
                        }
                    }
                }
                shape => return Some(shape),
            }
        }
    }
}

#[cfg(test)]
mod test_geo_fractal {
    use super::*;

    fn lines(shapes: &[FractalShape]) -> Vec<(WorldPoint, WorldPoint)> {
        shapes
            .iter()
            .filter_map(|shape| match shape {
                FractalShape::Line(a, b) => Some((*a, *b)),
                _ => None,
            })
            .collect()
    }

    fn vertices(shapes: &[FractalShape]) -> Vec<WorldPoint> {
        shapes
            .iter()
            .filter_map(|shape| match shape {
                FractalShape::Vertex { position, .. } => Some(*position),
                _ => None,
            })
            .collect()
    }

    fn assert_chained(lines: &[(WorldPoint, WorldPoint)]) {
        for pair in lines.windows(2) {
            assert!((pair[0].1 - pair[1].0).length() < 1e-3, "{:?} does not continue {:?}", pair[1], pair[0]);
        }
    }

    fn unit_frame(size: f32) -> CurveFrame {
        CurveFrame::new(WorldPoint::origin(), WorldVector::new(size, 0.0), WorldVector::new(0.0, size))
    }

    #[test]
    fn test_sierpinski_triangle() {
        let triangle = SierpinskiTriangle {
            corners: [WorldPoint::new(0.0, 0.0), WorldPoint::new(8.0, 0.0), WorldPoint::new(4.0, 8.0)],
        };
        assert_eq!(RecursiveGeoFractalRenderer::new(triangle, 0).count(), 1);
        assert_eq!(RecursiveGeoFractalRenderer::new(triangle, 2).count(), 9);
        assert_eq!(RecursiveGeoFractalRenderer::new(triangle, 2).final_step_as_output(false).count(), 0);
    }

    #[test]
    fn test_koch_curve() {
        let koch = KochCurve { from: WorldPoint::new(0.0, 0.0), to: WorldPoint::new(3.0, 0.0) };
        let shapes: Vec<_> = RecursiveGeoFractalRenderer::new(koch, 1).collect();
        let segments = lines(&shapes);
        assert_eq!(segments.len(), 4);
        assert_chained(&segments);
        assert!((segments[1].1 - WorldPoint::new(1.5, 0.75f32.sqrt())).length() < 1e-4);

        let segments = lines(&RecursiveGeoFractalRenderer::new(koch, 3).collect::<Vec<_>>());
        assert_eq!(segments.len(), 64);
        assert_chained(&segments);
        assert_eq!(segments.last().map(|s| s.1), Some(WorldPoint::new(3.0, 0.0)));
    }

    #[test]
    fn test_carpet() {
        let carpet = SierpinskiCarpet { origin: WorldPoint::origin(), size: 9.0 };
        assert_eq!(RecursiveGeoFractalRenderer::new(carpet, 1).count(), 8);
        let squares: Vec<_> = RecursiveGeoFractalRenderer::new(carpet, 2).collect();
        assert_eq!(squares.len(), 64);
        // the middle of the carpet stays empty
        assert!(!squares.iter().any(|shape| match shape {
            FractalShape::Polygon(v) => v[0] == WorldPoint::new(3.0, 3.0),
            _ => false,
        }));
    }

    #[test]
    fn test_dragon_curve() {
        let dragon = DragonCurve { from: WorldPoint::new(0.0, 0.0), to: WorldPoint::new(16.0, 0.0) };
        let segments = lines(&RecursiveGeoFractalRenderer::new(dragon, 6).collect::<Vec<_>>());
        assert_eq!(segments.len(), 64);
        assert_chained(&segments);
        assert_eq!(segments[0].0, WorldPoint::new(0.0, 0.0));
        assert!((segments[63].1 - WorldPoint::new(16.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_hilbert_order() {
        let hilbert = HilbertCurve { frame: unit_frame(8.0) };
        let cells = vertices(&RecursiveGeoFractalRenderer::new(hilbert, 1).collect::<Vec<_>>());
        assert_eq!(
            cells,
            vec![WorldPoint::new(2.0, 2.0), WorldPoint::new(2.0, 6.0), WorldPoint::new(6.0, 6.0), WorldPoint::new(6.0, 2.0)]
        );

        let joined: Vec<_> = VertexJoiner::new(RecursiveGeoFractalRenderer::new(hilbert, 3)).collect();
        let segments = lines(&joined);
        assert_eq!(segments.len(), 63);
        assert_chained(&segments);
        for (a, b) in segments {
            assert!(((b - a).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_peano_order() {
        let peano = PeanoCurve { frame: unit_frame(9.0) };
        let cells = vertices(&RecursiveGeoFractalRenderer::new(peano, 1).collect::<Vec<_>>());
        let expected: Vec<_> = [(1.5, 1.5), (1.5, 4.5), (1.5, 7.5), (4.5, 7.5), (4.5, 4.5), (4.5, 1.5), (7.5, 1.5), (7.5, 4.5), (7.5, 7.5)]
            .iter()
            .map(|&(x, y)| WorldPoint::new(x, y))
            .collect();
        assert_eq!(cells, expected);

        let segments = lines(&VertexJoiner::new(RecursiveGeoFractalRenderer::new(peano, 2)).collect::<Vec<_>>());
        assert_eq!(segments.len(), 80);
        assert_chained(&segments);
    }

    #[test]
    fn test_viewport_culling_is_conservative() {
        let hilbert = HilbertCurve { frame: unit_frame(16.0) };
        let viewport = WorldRect::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(5.0, 16.0));

        let mut full = RecursiveGeoFractalRenderer::new(hilbert, 3);
        let all = vertices(&full.by_ref().collect::<Vec<_>>());
        let mut culled = RecursiveGeoFractalRenderer::new(hilbert, 3).with_viewport(viewport);
        let visible = vertices(&culled.by_ref().collect::<Vec<_>>());

        assert!(visible.len() < all.len());
        assert!(culled.expansions() < full.expansions());
        for p in all.iter().filter(|p| viewport.contains(**p)) {
            assert!(visible.contains(p), "{:?} was culled", p);
        }

        // where the curve leaves the viewport, only neighbouring cells get joined back up
        let joined = lines(&VertexJoiner::new(RecursiveGeoFractalRenderer::new(hilbert, 3).with_viewport(viewport)).collect::<Vec<_>>());
        assert!(!joined.is_empty());
        for (a, b) in joined {
            assert!(((b - a).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        let dragon = DragonCurve { from: WorldPoint::new(0.0, 0.0), to: WorldPoint::new(1.0, 0.0) };
        let mut renderer = RecursiveGeoFractalRenderer::new(dragon, 10).with_cancellation(token.clone());

        assert!(renderer.next().is_some());
        token.cancel();
        let rest = renderer.by_ref().count();
        // only what was already expanded drains out
        assert!(rest < 2);
        assert!(renderer.next().is_none());
    }
}
