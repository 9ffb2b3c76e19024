use crate::{
    renderer::{ canvas::Canvas, RendererRegistry },
    scene_system::pipeline::RenderingPipeline,
};

pub fn init() {
    env_logger::init();
}

/// Hooks driven by [`App`]. `update` runs once per frame and may change the scene, which
/// marks it dirty and gets it drawn at the end of the same tick.
#[allow(unused)]
pub trait System {
    fn start(&mut self, state: &mut State) {}
    fn finish(&mut self, state: &mut State) {}
    fn update(&mut self, state: &mut State, frame: u64) {}
}

pub struct State {
    pub canvas: Canvas,
    pub pipeline: RenderingPipeline,
    pub registry: RendererRegistry,
}

impl State {
    pub fn new(canvas: Canvas, pipeline: RenderingPipeline) -> Self {
        Self { canvas, pipeline, registry: RendererRegistry::new() }
    }

    /// Clears and redraws the canvas as a single batch.
    pub fn render(&mut self) -> usize {
        let pipeline = &self.pipeline;
        self.canvas.update(|canvas| {
            canvas.clear();
            pipeline.render(canvas)
        })
    }
}

pub struct App {
    pub state: State,
    frame: u64,
}

impl App {
    pub fn new(state: State) -> Self {
        Self { state, frame: 0 }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs `frames` ticks between `start` and `finish`, returning how many of them drew.
    pub fn run<S: System>(&mut self, system: &mut S, frames: u64) -> u64 {
        system.start(&mut self.state);

        let mut rendered = 0;
        for _ in 0..frames {
            if self.tick(system) {
                rendered += 1;
            }
        }

        system.finish(&mut self.state);
        log::debug!("ran {} frames, {} of them rendered", frames, rendered);
        rendered
    }

    /// One frame: update, then redraw if anything was marked dirty.
    pub fn tick<S: System>(&mut self, system: &mut S) -> bool {
        system.update(&mut self.state, self.frame);
        self.frame += 1;

        if !self.state.pipeline.take_dirty() {
            return false;
        }
        let drawn = self.state.render();
        log::trace!("frame {} drew {} primitives", self.frame, drawn);
        true
    }
}

#[cfg(test)]
mod test_app {
    use super::*;
    use crate::{
        data::prelude::*,
        scene_system::{ objects::PointObject, Object2DStack, ObjectId },
    };

    struct Mover {
        id: Option<ObjectId>,
        started: bool,
        finished: bool,
    }

    impl System for Mover {
        fn start(&mut self, state: &mut State) {
            self.started = true;
            let point = PointObject::new(WorldPoint::new(1.0, 1.0), PointStyle { size: 1, ..PointStyle::default() });
            self.id = Some(state.pipeline.stack_mut().add(point));
        }

        fn update(&mut self, state: &mut State, frame: u64) {
            // move on every third frame only
            let Some(id) = self.id else { return };
            if frame % 3 != 0 {
                return;
            }
            if let Some(object) = state.pipeline.stack_mut().get_mut(id) {
                *object.transform_mut() = Transform2D::translation(frame as f32, 0.0);
            }
        }

        fn finish(&mut self, _state: &mut State) {
            self.finished = true;
        }
    }

    #[test]
    fn test_renders_only_dirty_frames() {
        let state = State::new(Canvas::new(16, 4), RenderingPipeline::standard(Object2DStack::new()));
        let mut app = App::new(state);
        let mut mover = Mover { id: None, started: false, finished: false };

        assert_eq!(app.run(&mut mover, 9), 3);
        assert!(mover.started && mover.finished);
        assert_eq!(app.frame(), 9);
        assert_eq!(app.state.canvas.update_count(), 3);

        // the last move was frame 6, the previous position was cleared
        assert_eq!(app.state.canvas.get(7, 1), Color::WHITE);
        assert_eq!(app.state.canvas.get(4, 1), Color::BLACK);
    }
}
