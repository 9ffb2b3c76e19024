use crate::{
    data::prelude::*,
    generator::{ ifs::ColoredPoint, FractalShape },
};

use super::{ Object2D, PrimitiveCollector };

fn center_of(points: &[WorldPoint]) -> WorldPoint {
    bounding_rect(points.iter()).map_or(WorldPoint::origin(), |rect| rect.center())
}

pub struct PointObject {
    pub position: WorldPoint,
    pub style: PointStyle,
    pub transform: Transform2D,
}

impl PointObject {
    pub fn new(position: WorldPoint, style: PointStyle) -> Self {
        Self { position, style, transform: Transform2D::identity() }
    }
}

impl Object2D for PointObject {
    fn name(&self) -> &str {
        "point"
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        self.position
    }

    fn emit(&self, collector: &mut PrimitiveCollector) {
        collector.add_point(self.position, self.style);
    }
}

pub struct LineObject {
    pub from: WorldPoint,
    pub to: WorldPoint,
    pub style: LineStyle,
    pub transform: Transform2D,
}

impl LineObject {
    pub fn new(from: WorldPoint, to: WorldPoint, style: LineStyle) -> Self {
        Self { from, to, style, transform: Transform2D::identity() }
    }
}

impl Object2D for LineObject {
    fn name(&self) -> &str {
        "line"
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        self.from.lerp(self.to, 0.5)
    }

    fn emit(&self, collector: &mut PrimitiveCollector) {
        collector.add_line(self.from, self.to, self.style);
    }
}

/// Connected segments through `points`, `closed` adds the segment back to the first point.
pub struct PolylineObject {
    pub points: Vec<WorldPoint>,
    pub closed: bool,
    pub style: LineStyle,
    pub transform: Transform2D,
}

impl PolylineObject {
    pub fn new(points: Vec<WorldPoint>, closed: bool, style: LineStyle) -> Self {
        Self { points, closed, style, transform: Transform2D::identity() }
    }
}

impl Object2D for PolylineObject {
    fn name(&self) -> &str {
        "polyline"
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        center_of(&self.points)
    }

    fn emit(&self, collector: &mut PrimitiveCollector) {
        for pair in self.points.windows(2) {
            collector.add_line(pair[0], pair[1], self.style);
        }
        if self.closed && self.points.len() > 2 {
            collector.add_line(self.points[self.points.len() - 1], self.points[0], self.style);
        }
    }
}

/// Filled convex polygon, with an optional outline drawn over the fill.
pub struct PolygonObject {
    pub vertices: Vec<WorldPoint>,
    pub fill: FillStyle,
    pub outline: Option<LineStyle>,
    pub transform: Transform2D,
}

impl PolygonObject {
    pub fn new(vertices: Vec<WorldPoint>, fill: FillStyle) -> Self {
        Self { vertices, fill, outline: None, transform: Transform2D::identity() }
    }

    pub fn with_outline(mut self, outline: LineStyle) -> Self {
        self.outline = Some(outline);
        self
    }
}

impl Object2D for PolygonObject {
    fn name(&self) -> &str {
        "polygon"
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        center_of(&self.vertices)
    }

    fn emit(&self, collector: &mut PrimitiveCollector) {
        collector.add_fill(&self.vertices, self.fill);
        if let Some(outline) = self.outline {
            let count = self.vertices.len();
            for i in 0..count {
                collector.add_line(self.vertices[i], self.vertices[(i + 1) % count], outline);
            }
        }
    }
}

pub struct SplineObject {
    pub spline: CubicSpline,
    pub style: SplineStyle,
    pub transform: Transform2D,
}

impl SplineObject {
    pub fn new(spline: CubicSpline, style: SplineStyle) -> Self {
        Self { spline, style, transform: Transform2D::identity() }
    }
}

impl Object2D for SplineObject {
    fn name(&self) -> &str {
        "spline"
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        self.spline.bounding_box().center()
    }

    fn emit(&self, collector: &mut PrimitiveCollector) {
        collector.add_spline(&self.spline, self.style);
    }
}

/// Emits nothing itself, its children are drawn in its coordinate frame.
pub struct GroupObject {
    name: String,
    pub children: Vec<Box<dyn Object2D>>,
    pub transform: Transform2D,
}

impl GroupObject {
    pub fn new(name: impl Into<String>, children: Vec<Box<dyn Object2D>>) -> Self {
        Self { name: name.into(), children, transform: Transform2D::identity() }
    }
}

impl Object2D for GroupObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        let centers: Vec<_> = self.children.iter().map(|child| child.center()).collect();
        center_of(&centers)
    }

    fn emit(&self, _collector: &mut PrimitiveCollector) {}

    fn children(&self) -> &[Box<dyn Object2D>] {
        &self.children
    }
}

/// A bag of generated shapes sharing one style per kind.
///
/// Polygons are filled when `fill_style` is set and outlined otherwise.
pub struct ShapeSetObject {
    pub lines: Vec<(WorldPoint, WorldPoint)>,
    pub polygons: Vec<Vec<WorldPoint>>,
    pub points: Vec<ColoredPoint>,
    pub line_style: LineStyle,
    pub fill_style: Option<FillStyle>,
    pub point_style: PointStyle,
    pub transform: Transform2D,
}

impl ShapeSetObject {
    pub fn new(line_style: LineStyle, fill_style: Option<FillStyle>, point_style: PointStyle) -> Self {
        Self {
            lines: Vec::new(),
            polygons: Vec::new(),
            points: Vec::new(),
            line_style,
            fill_style,
            point_style,
            transform: Transform2D::identity(),
        }
    }

    /// Stray [`FractalShape::Vertex`] outputs become points in the point style's color.
    pub fn from_shapes<I: IntoIterator<Item = FractalShape>>(
        shapes: I,
        line_style: LineStyle,
        fill_style: Option<FillStyle>,
        point_style: PointStyle,
    ) -> Self {
        let mut set = Self::new(line_style, fill_style, point_style);
        set.extend(shapes);
        set
    }

    pub fn extend<I: IntoIterator<Item = FractalShape>>(&mut self, shapes: I) {
        for shape in shapes {
            match shape {
                FractalShape::Line(from, to) => self.lines.push((from, to)),
                FractalShape::Polygon(vertices) => self.polygons.push(vertices),
                FractalShape::Vertex { position, .. } => {
                    self.points.push(ColoredPoint { position, color: self.point_style.color })
                }
            }
        }
    }

    pub fn from_points<I: IntoIterator<Item = ColoredPoint>>(points: I, point_style: PointStyle) -> Self {
        let mut set = Self::new(LineStyle::default(), None, point_style);
        set.points.extend(points);
        set
    }

    pub fn shape_count(&self) -> usize {
        self.lines.len() + self.polygons.len() + self.points.len()
    }
}

impl Object2D for ShapeSetObject {
    fn name(&self) -> &str {
        "shape-set"
    }

    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    fn center(&self) -> WorldPoint {
        let mut points: Vec<WorldPoint> = self.lines.iter().flat_map(|&(a, b)| [a, b]).collect();
        points.extend(self.polygons.iter().flatten());
        points.extend(self.points.iter().map(|p| p.position));
        center_of(&points)
    }

    fn emit(&self, collector: &mut PrimitiveCollector) {
        for (from, to) in &self.lines {
            collector.add_line(*from, *to, self.line_style);
        }

        for polygon in &self.polygons {
            match self.fill_style {
                Some(fill) => collector.add_fill(polygon, fill),
                None => {
                    let count = polygon.len();
                    for i in 0..count {
                        collector.add_line(polygon[i], polygon[(i + 1) % count], self.line_style);
                    }
                }
            }
        }

        for point in &self.points {
            collector.add_point(point.position, PointStyle { color: point.color, ..self.point_style });
        }
    }
}

#[cfg(test)]
mod test_objects {
    use super::*;
    use crate::scene_system::{ Object2DStack, Primitive, PrimitiveKind };

    fn collect<O: Object2D + 'static>(object: O, kind: PrimitiveKind) -> Vec<Primitive> {
        let mut stack = Object2DStack::new();
        stack.add(object);
        let mut collector = PrimitiveCollector::new(Some(kind));
        collector.collect(&stack, false);
        collector.into_primitives()
    }

    #[test]
    fn test_polyline() {
        let points = vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(4.0, 0.0), WorldPoint::new(4.0, 4.0)];
        let open = PolylineObject::new(points.clone(), false, LineStyle::default());
        assert_eq!(open.center(), WorldPoint::new(2.0, 2.0));
        assert_eq!(collect(open, PrimitiveKind::Line).len(), 2);

        let closed = PolylineObject::new(points, true, LineStyle::default());
        let lines = collect(closed, PrimitiveKind::Line);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], Primitive::Line(LineSegment::between(4, 4, 0, 0)));

        let empty = PolylineObject::new(Vec::new(), true, LineStyle::default());
        assert_eq!(empty.center(), WorldPoint::origin());
        assert!(collect(empty, PrimitiveKind::Line).is_empty());
    }

    #[test]
    fn test_polygon_fill_and_outline() {
        let square = vec![
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(2.0, 0.0),
            WorldPoint::new(2.0, 2.0),
            WorldPoint::new(0.0, 2.0),
        ];
        let polygon = PolygonObject::new(square.clone(), FillStyle::default());
        assert_eq!(collect(polygon, PrimitiveKind::Fill).len(), 1);
        let polygon = PolygonObject::new(square.clone(), FillStyle::default());
        assert!(collect(polygon, PrimitiveKind::Line).is_empty());

        let outlined = PolygonObject::new(square, FillStyle::default()).with_outline(LineStyle::default());
        assert_eq!(collect(outlined, PrimitiveKind::Line).len(), 4);
    }

    #[test]
    fn test_spline_rotates_about_center() {
        let spline = CubicSpline::new(
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(0.0, 10.0),
            WorldPoint::new(10.0, 10.0),
            WorldPoint::new(10.0, 0.0),
        );
        let mut object = SplineObject::new(spline, SplineStyle::default());
        object.transform = Transform2D::rotation(std::f32::consts::PI);

        match collect(object, PrimitiveKind::Spline).as_slice() {
            [Primitive::Spline(rotated)] => {
                let [p0, _, _, p3] = rotated.spline.control_points();
                assert!((p0 - WorldPoint::new(10.0, 10.0)).length() < 1e-4);
                assert!((p3 - WorldPoint::new(0.0, 10.0)).length() < 1e-4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_shape_set() {
        let shapes = vec![
            FractalShape::Line(WorldPoint::new(0.0, 0.0), WorldPoint::new(1.0, 0.0)),
            FractalShape::Polygon(vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(3.0, 0.0), WorldPoint::new(0.0, 3.0)]),
            FractalShape::Vertex { position: WorldPoint::new(5.0, 5.0), link_distance: 1.0 },
        ];
        let outlined = ShapeSetObject::from_shapes(shapes.clone(), LineStyle::default(), None, PointStyle::default());
        assert_eq!(outlined.shape_count(), 3);
        assert_eq!(collect(outlined, PrimitiveKind::Line).len(), 4);

        let filled = ShapeSetObject::from_shapes(shapes, LineStyle::default(), Some(FillStyle::default()), PointStyle::default());
        assert_eq!(collect(filled, PrimitiveKind::Fill).len(), 1);

        let cloud = ShapeSetObject::from_points(
            vec![ColoredPoint { position: WorldPoint::new(1.0, 1.0), color: Color::RED }],
            PointStyle { size: 1, ..PointStyle::default() },
        );
        match collect(cloud, PrimitiveKind::Point).as_slice() {
            [Primitive::Point(point)] => {
                assert_eq!(point.style.color, Color::RED);
                assert_eq!(point.style.size, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
