use raster_backend::{
    app::{ State, System },
    data::prelude::*,
    generator::{
        geo_fractal::*,
        ifs::{ Ifs, IfsFunction },
        lsystem::LSystem,
        FractalShape,
    },
    renderer::{ line::LineRendererKind, point::PointRendererKind, spline::SplineRendererKind },
    scene_system::{ objects::*, Object2D, Object2DStack, ObjectId },
};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Every rasterizer side by side
    Primitives,
    Sierpinski,
    Koch,
    Carpet,
    Dragon,
    Hilbert,
    Peano,
    /// Barnsley fern played as a chaos game
    Ifs,
    /// Bracketed plant grown by an L-system
    Lsystem,
}

pub struct SceneParams {
    /// Side of the square the scene should fit in.
    pub size: f32,
    pub steps: u32,
    pub seed: u64,
    pub points: usize,
}

pub struct DemoScene {
    pub stack: Object2DStack,
    /// Object the [`Spinner`] turns every frame.
    pub animated: Option<ObjectId>,
}

pub fn build(scene: Scene, params: &SceneParams) -> DemoScene {
    let half = params.size / 2.0 * 0.9;
    let viewport = WorldRect::new(WorldPoint::new(-half, -half), WorldPoint::new(half, half));
    let outline = LineStyle { color: Color::new(0.9, 0.9, 0.3, 1.0), ..LineStyle::default() };
    let fill = FillStyle { color: Color::new(0.2, 0.5, 0.9, 1.0) };

    let shapes: Vec<FractalShape> = match scene {
        Scene::Primitives => return primitives(half),
        Scene::Ifs => return fern(params, half),
        Scene::Lsystem => return plant(params, half),
        Scene::Sierpinski => {
            let corners = [WorldPoint::new(-half, -half), WorldPoint::new(half, -half), WorldPoint::new(0.0, half)];
            RecursiveGeoFractalRenderer::new(SierpinskiTriangle { corners }, params.steps).with_viewport(viewport).collect()
        }
        Scene::Koch => {
            let koch = KochCurve { from: WorldPoint::new(-half, -half / 3.0), to: WorldPoint::new(half, -half / 3.0) };
            RecursiveGeoFractalRenderer::new(koch, params.steps).with_viewport(viewport).collect()
        }
        Scene::Carpet => {
            let carpet = SierpinskiCarpet { origin: WorldPoint::new(-half, -half), size: half * 2.0 };
            RecursiveGeoFractalRenderer::new(carpet, params.steps).with_viewport(viewport).collect()
        }
        Scene::Dragon => {
            let dragon = DragonCurve { from: WorldPoint::new(-half / 2.0, 0.0), to: WorldPoint::new(half / 2.0, 0.0) };
            RecursiveGeoFractalRenderer::new(dragon, params.steps).with_viewport(viewport).collect()
        }
        Scene::Hilbert => {
            let frame = CurveFrame::new(WorldPoint::new(-half, -half), WorldVector::new(half * 2.0, 0.0), WorldVector::new(0.0, half * 2.0));
            VertexJoiner::new(RecursiveGeoFractalRenderer::new(HilbertCurve { frame }, params.steps).with_viewport(viewport)).collect()
        }
        Scene::Peano => {
            let frame = CurveFrame::new(WorldPoint::new(-half, -half), WorldVector::new(half * 2.0, 0.0), WorldVector::new(0.0, half * 2.0));
            VertexJoiner::new(RecursiveGeoFractalRenderer::new(PeanoCurve { frame }, params.steps).with_viewport(viewport)).collect()
        }
    };
    log::info!("{:?} generated {} shapes", scene, shapes.len());

    let filled = matches!(scene, Scene::Sierpinski | Scene::Carpet).then_some(fill);
    let mut stack = Object2DStack::new();
    stack.add(ShapeSetObject::from_shapes(shapes, outline, filled, PointStyle::default()));
    DemoScene { stack, animated: None }
}

fn primitives(half: f32) -> DemoScene {
    let mut stack = Object2DStack::new();
    let row = half * 2.0 / LineRendererKind::ALL.len() as f32;

    for (i, kind) in LineRendererKind::ALL.into_iter().enumerate() {
        let y = half - row * (i as f32 + 0.5);
        let from = WorldPoint::new(-half, y);
        let to = match kind {
            LineRendererKind::Orthogonal => WorldPoint::new(-half * 0.1, y),
            LineRendererKind::Diagonal => WorldPoint::new(-half + row * 0.8, y + row * 0.8),
            _ => WorldPoint::new(-half * 0.1, y + row * 0.8),
        };
        let breadth = if kind.uses_breadth() { 4.0 } else { 1.0 };
        stack.add(LineObject::new(from, to, LineStyle { color: Color::WHITE, breadth, renderer: Some(kind) }));
    }

    let column = half * 2.0 / PointRendererKind::ALL.len() as f32;
    for (i, kind) in PointRendererKind::ALL.into_iter().enumerate() {
        let position = WorldPoint::new(half * 0.85, half - column * (i as f32 + 0.5));
        stack.add(PointObject::new(position, PointStyle { color: Color::GREEN, size: 11, renderer: Some(kind) }));
    }

    let hexagon: Vec<_> = (0..6)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::FRAC_PI_3;
            WorldPoint::new(half * 0.4 + angle.cos() * half * 0.25, half * 0.5 + angle.sin() * half * 0.25)
        })
        .collect();
    stack.add(
        PolygonObject::new(hexagon, FillStyle { color: Color::new(0.2, 0.3, 0.8, 1.0) })
            .with_outline(LineStyle { color: Color::WHITE, ..LineStyle::default() }),
    );

    let triangle = PolylineObject::new(
        vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(half * 0.2, 0.0), WorldPoint::new(half * 0.1, half * 0.2)],
        true,
        LineStyle { color: Color::RED, ..LineStyle::default() },
    );
    let mut group = GroupObject::new("triangles", vec![Box::new(triangle) as Box<dyn Object2D>]);
    group.transform = Transform2D::translation(half * 0.2, -half * 0.1);
    stack.add(group);

    let spline = CubicSpline::new(
        WorldPoint::new(0.0, -half * 0.9),
        WorldPoint::new(half * 0.1, -half * 0.2),
        WorldPoint::new(half * 0.6, -half * 0.9),
        WorldPoint::new(half * 0.7, -half * 0.3),
    );
    let stamp = PointStyle { color: Color::RED, size: 7, renderer: Some(PointRendererKind::HollowCircleAntialiased) };
    let style = SplineStyle {
        color: Color::new(1.0, 0.6, 0.2, 1.0),
        breadth: 3.0,
        renderer: Some(SplineRendererKind::AdaptiveStepBreadth),
        endpoint_style: Some(stamp),
        midpoint_style: Some(PointStyle { size: 5, ..stamp }),
    };
    let animated = stack.add(SplineObject::new(spline, style));

    DemoScene { stack, animated: Some(animated) }
}

fn fern(params: &SceneParams, half: f32) -> DemoScene {
    let leaf = |a, b, c, d, e, f, weight, color| IfsFunction::new(Transform2D::new(a, b, c, d, e, f), weight, color);
    let functions = vec![
        leaf(0.0, 0.0, 0.0, 0.16, 0.0, 0.0, 0.01, Color::new(0.4, 0.3, 0.1, 1.0)),
        leaf(0.85, 0.04, -0.04, 0.85, 0.0, 1.6, 0.85, Color::new(0.2, 0.8, 0.2, 1.0)),
        leaf(0.2, -0.26, 0.23, 0.22, 0.0, 1.6, 0.07, Color::new(0.3, 0.9, 0.4, 1.0)),
        leaf(-0.15, 0.28, 0.26, 0.24, 0.0, 0.44, 0.07, Color::new(0.1, 0.6, 0.3, 1.0)),
    ];

    let mut stack = Object2DStack::new();
    let Some(ifs) = Ifs::new(functions, 20) else {
        log::warn!("fern system rejected, nothing to draw");
        return DemoScene { stack, animated: None };
    };

    // the fern spans about [-2.2, 2.7] x [0, 10]
    let scale = half * 2.0 / 10.0;
    let fit = &Transform2D::translation(-0.25 * scale, -half) * &Transform2D::scale(scale, scale);
    let workers = 4;
    let points: Vec<_> = ifs
        .sample_parallel(workers, params.points / workers, params.seed, 1024)
        .map(|mut point| {
            point.position = fit.transform(point.position);
            point
        })
        .collect();
    log::info!("ifs produced {} points", points.len());

    let point_style = PointStyle { size: 1, renderer: Some(PointRendererKind::Square), ..PointStyle::default() };
    stack.add(ShapeSetObject::from_points(points, point_style));
    DemoScene { stack, animated: None }
}

fn plant(params: &SceneParams, half: f32) -> DemoScene {
    let mut stack = Object2DStack::new();
    let Some(system) = LSystem::parse("X", &["X=F+[[X]-X]-F[-X]+X", "F=FF"]) else {
        return DemoScene { stack, animated: None };
    };
    // the trunk doubles every generation
    let step = half * 1.6 / 2f32.powi(params.steps as i32 + 1);
    let system = system.with_angle(25.0).with_step(step);

    let branches = system.turtle(params.steps, WorldPoint::new(-half * 0.6, -half), 65.0);
    let style = LineStyle { color: Color::new(0.4, 0.9, 0.3, 1.0), ..LineStyle::default() };
    let set = ShapeSetObject::from_shapes(branches, style, None, PointStyle::default());
    log::info!("l-system drew {} branches", set.shape_count());
    stack.add(set);
    DemoScene { stack, animated: None }
}

/// Turns one object a little further every frame.
pub struct Spinner {
    target: Option<ObjectId>,
    radians_per_frame: f32,
}

impl Spinner {
    pub fn new(target: Option<ObjectId>, radians_per_frame: f32) -> Self {
        Self { target, radians_per_frame }
    }
}

impl System for Spinner {
    fn update(&mut self, state: &mut State, frame: u64) {
        let Some(id) = self.target else { return };
        if frame == 0 {
            return;
        }
        if let Some(object) = state.pipeline.stack_mut().get_mut(id) {
            *object.transform_mut() = Transform2D::rotation(frame as f32 * self.radians_per_frame);
        }
    }
}
