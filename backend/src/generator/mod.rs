//! Procedural geometry. Every generator is a lazy iterator, so the caller decides how much
//! work happens per frame and can stop it between any two items.

pub mod geo_fractal;
pub mod ifs;
pub mod lsystem;

use std::sync::{
    atomic::{ AtomicBool, Ordering },
    Arc,
};

use crate::data::prelude::*;

/// Cooperative stop signal, checked by generators at each yield point. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FractalShape {
    Line(WorldPoint, WorldPoint),
    Polygon(Vec<WorldPoint>),
    /// One vertex of a space-filling curve. Consecutive vertices no farther apart than
    /// `link_distance` are neighbours on the curve.
    Vertex { position: WorldPoint, link_distance: f32 },
}
