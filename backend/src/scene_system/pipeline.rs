use crate::{
    data::prelude::*,
    renderer::{
        canvas::Canvas,
        fill,
        line::LineRendererKind,
        point::PointRendererKind,
        spline::SplineRendererKind,
    },
};

use super::{ Object2DStack, Primitive, PrimitiveCollector, PrimitiveKind };

/// Per-pass fallbacks. An `enforce_*` flag makes the pass ignore the primitive's own value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings<R> {
    pub fallback_renderer: R,
    pub enforce_renderer: bool,
    pub fallback_color: Color,
    pub enforce_color: bool,
    /// Breadth for lines and splines, stamp size for points.
    pub fallback_size: f32,
    pub enforce_size: bool,
    /// Draw in world space, skipping every object transform.
    pub ignore_transforms: bool,
}

impl<R: Copy> RenderSettings<R> {
    pub fn new(fallback_renderer: R, fallback_size: f32) -> Self {
        Self {
            fallback_renderer,
            enforce_renderer: false,
            fallback_color: Color::WHITE,
            enforce_color: false,
            fallback_size,
            enforce_size: false,
            ignore_transforms: false,
        }
    }

    pub fn renderer(&self, own: Option<R>) -> R {
        match own {
            Some(own) if !self.enforce_renderer => own,
            _ => self.fallback_renderer,
        }
    }

    pub fn color(&self, own: Color) -> Color {
        if self.enforce_color { self.fallback_color } else { own }
    }

    pub fn size(&self, own: f32) -> f32 {
        if self.enforce_size { self.fallback_size } else { own }
    }
}

pub type LineSettings = RenderSettings<LineRendererKind>;
pub type PointSettings = RenderSettings<PointRendererKind>;
pub type SplineSettings = RenderSettings<SplineRendererKind>;

impl Default for LineSettings {
    fn default() -> Self {
        Self::new(LineRendererKind::Bresenham, 1.0)
    }
}

impl Default for PointSettings {
    fn default() -> Self {
        Self::new(PointRendererKind::Circle, 5.0)
    }
}

impl Default for SplineSettings {
    fn default() -> Self {
        Self::new(SplineRendererKind::AdaptiveStep, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillSettings {
    pub fallback_color: Color,
    pub enforce_color: bool,
    pub ignore_transforms: bool,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self { fallback_color: Color::WHITE, enforce_color: false, ignore_transforms: false }
    }
}

/// One walk over the scene that draws a single kind of primitive.
///
/// Runs Collecting then Dispatching and keeps nothing between calls.
pub trait RenderPass {
    fn name(&self) -> &str;

    /// Returns the number of primitives drawn.
    fn render(&self, canvas: &mut Canvas, stack: &Object2DStack) -> usize;
}

fn collect(pass: &str, kind: PrimitiveKind, stack: &Object2DStack, ignore_transforms: bool) -> Vec<Primitive> {
    log::trace!("{} pass: collecting", pass);
    let mut collector = PrimitiveCollector::new(Some(kind));
    collector.collect(stack, ignore_transforms);
    log::trace!("{} pass: dispatching {} primitives", pass, collector.len());
    collector.into_primitives()
}

fn wrong_kind(pass: &str, primitive: &Primitive) -> ! {
    panic!("{} pass was handed a {:?} primitive", pass, primitive.kind())
}

#[derive(Debug, Clone, Default)]
pub struct WireframePass {
    pub settings: LineSettings,
}

impl RenderPass for WireframePass {
    fn name(&self) -> &str {
        "wireframe"
    }

    fn render(&self, canvas: &mut Canvas, stack: &Object2DStack) -> usize {
        let settings = &self.settings;
        let primitives = collect(self.name(), PrimitiveKind::Line, stack, settings.ignore_transforms);
        for primitive in &primitives {
            let Primitive::Line(segment) = primitive else { wrong_kind(self.name(), primitive) };

            let style = LineStyle {
                color: settings.color(segment.style.color),
                breadth: settings.size(segment.style.breadth),
                renderer: None,
            };
            let renderer = settings.renderer(segment.style.renderer);
            renderer.render(&segment.with_style(style), &mut canvas.sink(style.color));
        }
        primitives.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PointPass {
    pub settings: PointSettings,
}

impl RenderPass for PointPass {
    fn name(&self) -> &str {
        "point"
    }

    fn render(&self, canvas: &mut Canvas, stack: &Object2DStack) -> usize {
        let settings = &self.settings;
        let primitives = collect(self.name(), PrimitiveKind::Point, stack, settings.ignore_transforms);
        for primitive in &primitives {
            let Primitive::Point(point) = primitive else { wrong_kind(self.name(), primitive) };

            let color = settings.color(point.style.color);
            let size = settings.size(point.style.size as f32).round() as i32;
            let renderer = settings.renderer(point.style.renderer);
            renderer.stamp(point.position, size, &mut canvas.sink(color));
        }
        primitives.len()
    }
}

/// Curves plus their optional end point and midpoint stamps, drawn on top of the curve.
#[derive(Debug, Clone)]
pub struct SplinePass {
    pub settings: SplineSettings,
    /// Used by stamps whose style names no renderer.
    pub stamp_renderer: PointRendererKind,
}

impl Default for SplinePass {
    fn default() -> Self {
        Self { settings: SplineSettings::default(), stamp_renderer: PointRendererKind::Circle }
    }
}

impl SplinePass {
    fn stamp(&self, canvas: &mut Canvas, position: WorldPoint, style: &PointStyle) {
        if position.x.is_finite() && position.y.is_finite() {
            let renderer = style.renderer.unwrap_or(self.stamp_renderer);
            renderer.stamp(to_pixel(position), style.size, &mut canvas.sink(style.color));
        }
    }
}

impl RenderPass for SplinePass {
    fn name(&self) -> &str {
        "spline"
    }

    fn render(&self, canvas: &mut Canvas, stack: &Object2DStack) -> usize {
        let settings = &self.settings;
        let primitives = collect(self.name(), PrimitiveKind::Spline, stack, settings.ignore_transforms);
        for primitive in &primitives {
            let Primitive::Spline(curve) = primitive else { wrong_kind(self.name(), primitive) };

            let mut style = curve.style;
            style.color = settings.color(style.color);
            style.breadth = settings.size(style.breadth);
            let renderer = settings.renderer(style.renderer);
            renderer.render(&SplinePrimitive::new(curve.spline, style), &mut canvas.sink(style.color));

            let [p0, _, _, p3] = curve.spline.control_points();
            if let Some(endpoint) = &style.endpoint_style {
                self.stamp(canvas, p0, endpoint);
                self.stamp(canvas, p3, endpoint);
            }
            if let Some(midpoint) = &style.midpoint_style {
                self.stamp(canvas, curve.spline.value_at(0.5), midpoint);
            }
        }
        primitives.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FillPass {
    pub settings: FillSettings,
}

impl RenderPass for FillPass {
    fn name(&self) -> &str {
        "fill"
    }

    fn render(&self, canvas: &mut Canvas, stack: &Object2DStack) -> usize {
        let settings = &self.settings;
        let primitives = collect(self.name(), PrimitiveKind::Fill, stack, settings.ignore_transforms);
        for primitive in &primitives {
            let Primitive::Fill(polygon) = primitive else { wrong_kind(self.name(), primitive) };

            let color = if settings.enforce_color { settings.fallback_color } else { polygon.style.color };
            fill::render_convexity_test(polygon, &mut canvas.sink(color));
        }
        primitives.len()
    }
}

/// Passes run in registration order, then every post pipeline in turn. A whole render is
/// a single canvas batch, so it costs the display exactly one redraw.
pub struct RenderingPipeline {
    stack: Object2DStack,
    passes: Vec<Box<dyn RenderPass>>,
    post_pipelines: Vec<RenderingPipeline>,
}

impl RenderingPipeline {
    pub fn new(stack: Object2DStack) -> Self {
        Self { stack, passes: Vec::new(), post_pipelines: Vec::new() }
    }

    /// Fill, wireframe, spline, then point pass, so outlines and stamps land on top of fills.
    pub fn standard(stack: Object2DStack) -> Self {
        Self::new(stack)
            .with_pass(FillPass::default())
            .with_pass(WireframePass::default())
            .with_pass(SplinePass::default())
            .with_pass(PointPass::default())
    }

    pub fn with_pass<P: RenderPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn add_pass(&mut self, pass: Box<dyn RenderPass>) {
        self.passes.push(pass);
    }

    pub fn add_post_pipeline(&mut self, pipeline: RenderingPipeline) {
        self.post_pipelines.push(pipeline);
    }

    pub fn passes(&self) -> &[Box<dyn RenderPass>] {
        &self.passes
    }

    pub fn post_pipelines_mut(&mut self) -> &mut [RenderingPipeline] {
        &mut self.post_pipelines
    }

    pub fn stack(&self) -> &Object2DStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Object2DStack {
        &mut self.stack
    }

    /// Whether this pipeline's scene or any post pipeline's scene changed.
    pub fn is_dirty(&self) -> bool {
        self.stack.is_dirty() || self.post_pipelines.iter().any(RenderingPipeline::is_dirty)
    }

    /// Clears the dirty flags of the whole tree, returning whether any was set.
    pub fn take_dirty(&mut self) -> bool {
        let mut dirty = self.stack.take_dirty();
        for pipeline in &mut self.post_pipelines {
            dirty |= pipeline.take_dirty();
        }
        dirty
    }

    /// Returns the number of primitives drawn across all passes and post pipelines.
    pub fn render(&self, canvas: &mut Canvas) -> usize {
        canvas.update(|canvas| {
            let drawn = self.render_passes(canvas);
            log::debug!("pipeline drew {} primitives", drawn);
            drawn
        })
    }

    fn render_passes(&self, canvas: &mut Canvas) -> usize {
        let mut drawn = 0;
        for pass in &self.passes {
            let count = pass.render(canvas, &self.stack);
            log::debug!("{} pass drew {} primitives", pass.name(), count);
            drawn += count;
        }
        for pipeline in &self.post_pipelines {
            drawn += pipeline.render_passes(canvas);
        }
        drawn
    }
}
