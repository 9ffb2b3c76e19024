use rand::{ rngs::StdRng, Rng, SeedableRng };

use raster_backend::{
    data::prelude::*,
    generator::ifs::{ Ifs, IfsFunction },
    renderer::canvas::Canvas,
    scene_system::{
        objects::{ LineObject, PolygonObject },
        pipeline::{ FillPass, RenderingPipeline, WireframePass },
        Object2DStack,
    },
};

fn unit_square() -> Vec<WorldPoint> {
    vec![
        WorldPoint::new(-1.0, -1.0),
        WorldPoint::new(1.0, -1.0),
        WorldPoint::new(1.0, 1.0),
        WorldPoint::new(-1.0, 1.0),
    ]
}

#[test]
fn transform_round_trip() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..200 {
        let mut coefficient = || rng.gen_range(-3.0f32..3.0);
        let t = Transform2D::new(coefficient(), coefficient(), coefficient(), coefficient(), coefficient(), coefficient());
        if t.determinant().abs() < 0.5 {
            continue;
        }

        let p = WorldPoint::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        let back = t.inverse().transform(t.transform(p));
        assert!((back - p).length() < 1e-4 * p.to_vector().length().max(1.0), "{:?} came back as {:?}", p, back);
    }
}

#[test]
fn balanced_stack_returns_to_identity() {
    let mut stack = Transform2DStack::new();
    for depth in 1..=10 {
        for i in 0..depth {
            stack.push(&Transform2D::rotation(i as f32).localize(WorldPoint::new(i as f32, 2.0)));
        }
        for _ in 0..depth {
            assert!(stack.pop().is_some());
        }
        assert!(stack.current().is_identity());
        assert!(stack.is_empty());
    }
    assert!(stack.pop().is_none());
}

#[test]
fn scaled_square_fills_its_box() {
    let mut polygon = PolygonObject::new(unit_square(), FillStyle { color: Color::RED });
    polygon.transform = &Transform2D::translation(5.0, 5.0) * &Transform2D::scale(5.0, 5.0);
    let mut stack = Object2DStack::new();
    stack.add(polygon);

    let mut canvas = Canvas::new(16, 16);
    let pipeline = RenderingPipeline::new(stack).with_pass(FillPass::default());
    assert_eq!(pipeline.render(&mut canvas), 1);

    let red = canvas.pixels().iter().filter(|&&pixel| pixel == Color::RED).count();
    assert_eq!(red, 121);
    assert_eq!(canvas.get(10, 10), Color::RED);
    assert_eq!(canvas.get(11, 10), Color::BLACK);
}

#[test]
fn later_passes_draw_over_earlier_ones() {
    let mut polygon = PolygonObject::new(unit_square(), FillStyle { color: Color::RED })
        .with_outline(LineStyle { color: Color::GREEN, ..LineStyle::default() });
    polygon.transform = &Transform2D::translation(5.0, 5.0) * &Transform2D::scale(4.0, 4.0);
    let mut stack = Object2DStack::new();
    stack.add(polygon);

    let mut canvas = Canvas::new(12, 12);
    RenderingPipeline::new(stack)
        .with_pass(FillPass::default())
        .with_pass(WireframePass::default())
        .render(&mut canvas);
    assert_eq!(canvas.get(1, 1), Color::GREEN);
    assert_eq!(canvas.get(9, 5), Color::GREEN);
    assert_eq!(canvas.get(5, 5), Color::RED);

    // same scene, fill registered last covers the outline
    let mut polygon = PolygonObject::new(unit_square(), FillStyle { color: Color::RED })
        .with_outline(LineStyle { color: Color::GREEN, ..LineStyle::default() });
    polygon.transform = &Transform2D::translation(5.0, 5.0) * &Transform2D::scale(4.0, 4.0);
    let mut stack = Object2DStack::new();
    stack.add(polygon);

    let mut canvas = Canvas::new(12, 12);
    RenderingPipeline::new(stack)
        .with_pass(WireframePass::default())
        .with_pass(FillPass::default())
        .render(&mut canvas);
    assert_eq!(canvas.get(1, 1), Color::RED);
}

#[test]
fn post_pipeline_draws_last_in_one_batch() {
    let mut stack = Object2DStack::new();
    stack.add(LineObject::new(WorldPoint::new(0.0, 2.0), WorldPoint::new(7.0, 2.0), LineStyle { color: Color::RED, ..LineStyle::default() }));
    let mut overlay = Object2DStack::new();
    overlay.add(LineObject::new(WorldPoint::new(3.0, 0.0), WorldPoint::new(3.0, 7.0), LineStyle { color: Color::BLUE, ..LineStyle::default() }));

    let mut pipeline = RenderingPipeline::new(stack).with_pass(WireframePass::default());
    pipeline.add_post_pipeline(RenderingPipeline::new(overlay).with_pass(WireframePass::default()));

    let mut canvas = Canvas::new(8, 8);
    assert_eq!(pipeline.render(&mut canvas), 2);
    assert_eq!(canvas.update_count(), 1);
    assert_eq!(canvas.get(3, 2), Color::BLUE);
    assert_eq!(canvas.get(4, 2), Color::RED);

    assert!(pipeline.take_dirty());
    assert!(!pipeline.is_dirty());
}

#[test]
fn identity_ifs_stays_on_its_fixed_point() {
    let ifs = Ifs::new(vec![IfsFunction::new(Transform2D::identity(), 1.0, Color::GREEN)], 0).unwrap();
    let start = WorldPoint::new(0.25, -3.0);
    let orbit: Vec<_> = ifs.orbit(StdRng::seed_from_u64(42), start).take(100).collect();

    assert_eq!(orbit.len(), 100);
    assert!(orbit.iter().all(|point| point.position == start && point.color == Color::GREEN));
}

#[test]
fn seeded_orbits_repeat() {
    let halve = |x, y| Transform2D::new(0.5, 0.0, 0.0, 0.5, x, y);
    let ifs = Ifs::new(
        vec![
            IfsFunction::new(halve(0.0, 0.0), 1.0, Color::RED),
            IfsFunction::new(halve(0.5, 0.0), 1.0, Color::GREEN),
            IfsFunction::new(halve(0.25, 0.5), 1.0, Color::BLUE),
        ],
        10,
    )
    .unwrap();

    let run = |seed| ifs.orbit(StdRng::seed_from_u64(seed), WorldPoint::origin()).take(500).collect::<Vec<_>>();
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
    assert!(run(5).iter().all(|point| (0.0..=1.0).contains(&point.position.x) && (0.0..=1.0).contains(&point.position.y)));
}
