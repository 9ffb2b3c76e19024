use std::path::{ Path, PathBuf };

use clap::Parser;

use raster_backend::{
    app::{ App, State },
    data::prelude::*,
    renderer::{ canvas::Canvas, RendererRegistry },
    scene_system::{
        objects::LineObject,
        pipeline::{ FillPass, PointPass, RenderingPipeline, SplinePass, WireframePass },
        Object2DStack,
    },
};

mod demo_scene;
mod settings;

use demo_scene::{ Scene, SceneParams, Spinner };
use settings::EditorSettings;

#[derive(clap::Parser, Debug)]
#[command(name = "raster-editor", version, about = "Draws a demo scene through the rendering pipeline into a PNG", long_about = None)]
struct Arguments {
    /// Scene to draw
    #[arg(long, value_enum, default_value_t = Scene::Primitives)]
    scene: Scene,

    /// JSON file with pass and canvas settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to this file
    #[arg(long)]
    save_settings: Option<PathBuf>,

    #[arg(long, short, default_value = "canvas.png")]
    output: PathBuf,

    /// Frames to run, the animated object turns a little every frame
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Recursion depth of fractal scenes
    #[arg(long, default_value_t = 4)]
    steps: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Points sampled by the ifs scene
    #[arg(long, default_value_t = 40_000)]
    points: usize,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Draw world axes on top of the scene
    #[clap(long, action = clap::ArgAction::SetTrue)]
    axes: bool,
}

impl Arguments {
    fn update_settings(&self, settings: &mut EditorSettings) {
        if let Some(width) = self.width {
            settings.canvas.width = width;
        }

        if let Some(height) = self.height {
            settings.canvas.height = height;
        }
    }
}

fn main() -> anyhow::Result<()> {
    raster_backend::app::init();

    let args = Arguments::parse();
    let registry = RendererRegistry::new();

    let mut settings = match &args.settings {
        Some(path) => {
            let loaded = settings::load(path, &registry)?;
            log::info!("loaded settings from {}", path.display());
            loaded
        }
        None => EditorSettings::default(),
    };
    args.update_settings(&mut settings);
    if settings.canvas.width <= 0 || settings.canvas.height <= 0 {
        anyhow::bail!("canvas must be at least 1x1, got {}x{}", settings.canvas.width, settings.canvas.height);
    }

    if let Some(path) = &args.save_settings {
        settings::save(&settings, path)?;
        log::info!("saved settings to {}", path.display());
    }

    let mut canvas = Canvas::with_background(settings.canvas.width, settings.canvas.height, settings.canvas.background);
    canvas.center_origin();

    let params = SceneParams {
        size: settings.canvas.width.min(settings.canvas.height) as f32,
        steps: args.steps,
        seed: args.seed,
        points: args.points,
    };
    let scene = demo_scene::build(args.scene, &params);
    log::info!("built {:?} scene with {} objects", args.scene, scene.stack.len());

    let mut pipeline = build_pipeline(scene.stack, &settings);
    if args.axes {
        pipeline.add_post_pipeline(axes_overlay(&settings));
    }

    let mut state = State::new(canvas, pipeline);
    state.registry = registry;
    let mut app = App::new(state);
    let rendered = app.run(&mut Spinner::new(scene.animated, 0.05), args.frames);
    log::info!("rendered {} of {} frames", rendered, args.frames);

    write_png(&app.state.canvas, &args.output)?;
    log::info!("wrote {}", args.output.display());

    Ok(())
}

fn build_pipeline(stack: Object2DStack, settings: &EditorSettings) -> RenderingPipeline {
    RenderingPipeline::new(stack)
        .with_pass(FillPass { settings: settings.fill })
        .with_pass(WireframePass { settings: settings.wireframe })
        .with_pass(SplinePass { settings: settings.splines, ..SplinePass::default() })
        .with_pass(PointPass { settings: settings.points })
}

/// Both axes across the whole canvas, drawn in world space regardless of transforms.
fn axes_overlay(settings: &EditorSettings) -> RenderingPipeline {
    let half_width = settings.canvas.width as f32 / 2.0;
    let half_height = settings.canvas.height as f32 / 2.0;
    let style = LineStyle::default();

    let mut stack = Object2DStack::new();
    stack.add(LineObject::new(WorldPoint::new(-half_width, 0.0), WorldPoint::new(half_width, 0.0), style));
    stack.add(LineObject::new(WorldPoint::new(0.0, -half_height), WorldPoint::new(0.0, half_height), style));

    let mut wireframe = WireframePass::default();
    wireframe.settings.fallback_color = Color::new(0.5, 0.5, 0.5, 0.6);
    wireframe.settings.enforce_color = true;
    wireframe.settings.ignore_transforms = true;
    RenderingPipeline::new(stack).with_pass(wireframe)
}

fn write_png(canvas: &Canvas, path: &Path) -> anyhow::Result<()> {
    let bytes: Vec<u8> = canvas.to_rgba8().iter().flat_map(Rgba8::to_array).collect();
    let image = image::RgbaImage::from_raw(canvas.width() as u32, canvas.height() as u32, bytes)
        .ok_or_else(|| anyhow::anyhow!("canvas buffer does not match its {}x{} size", canvas.width(), canvas.height()))?;
    image.save(path)?;

    Ok(())
}

#[cfg(test)]
mod test_main {
    use super::*;

    #[test]
    fn test_arguments() {
        let args = Arguments::try_parse_from(["raster-editor", "--scene", "koch", "--width", "64", "--axes"]).unwrap();
        assert_eq!(args.scene, Scene::Koch);
        assert!(args.axes);

        let mut settings = EditorSettings::default();
        args.update_settings(&mut settings);
        assert_eq!(settings.canvas.width, 64);
        assert_eq!(settings.canvas.height, 256);

        assert!(Arguments::try_parse_from(["raster-editor", "--scene", "mandelbrot"]).is_err());
    }

    #[test]
    fn test_koch_scene_renders() {
        let settings = EditorSettings::default();
        let mut canvas = Canvas::with_background(64, 64, settings.canvas.background);
        canvas.center_origin();
        let scene = demo_scene::build(Scene::Koch, &SceneParams { size: 64.0, steps: 2, seed: 0, points: 0 });

        let mut app = App::new(State::new(canvas, build_pipeline(scene.stack, &settings)));
        assert_eq!(app.run(&mut Spinner::new(scene.animated, 0.05), 2), 1);
        assert!(app.state.canvas.pixels().iter().any(|&pixel| pixel != Color::BLACK));
    }

    #[test]
    fn test_primitives_scene_spins() {
        let settings = EditorSettings::default();
        let scene = demo_scene::build(Scene::Primitives, &SceneParams { size: 128.0, steps: 1, seed: 0, points: 0 });
        assert!(scene.animated.is_some());

        let mut pipeline = build_pipeline(scene.stack, &settings);
        pipeline.add_post_pipeline(axes_overlay(&settings));
        let mut app = App::new(State::new(Canvas::new(128, 128), pipeline));
        // first frame draws the initial scene, every later one turns the spline
        assert_eq!(app.run(&mut Spinner::new(scene.animated, 0.05), 3), 3);
    }

    #[test]
    fn test_png_export() {
        let mut canvas = Canvas::new(3, 2);
        canvas.set(0, 0, Color::RED);
        let path = std::env::temp_dir().join(format!("raster-editor-{}.png", std::process::id()));
        write_png(&canvas, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        // pixel row 0 is the bottom of the canvas
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }
}
