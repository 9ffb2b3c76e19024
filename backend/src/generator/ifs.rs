use std::{
    sync::mpsc::{ self, Receiver },
    thread,
};

use rand::{ rngs::StdRng, Rng, SeedableRng };

use crate::data::prelude::*;

use super::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredPoint {
    pub position: WorldPoint,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct IfsFunction {
    pub transform: Transform2D,
    /// Relative probability of being picked, need not sum to one across the system.
    pub weight: f32,
    pub color: Color,
}

impl IfsFunction {
    pub fn new(transform: Transform2D, weight: f32, color: Color) -> Self {
        Self { transform, weight, color }
    }
}

/// Iterated function system: a weighted set of affine maps, played as a chaos game.
#[derive(Debug, Clone)]
pub struct Ifs {
    functions: Vec<IfsFunction>,
    cumulative: Vec<f32>,
    trace_from: usize,
}

impl Ifs {
    /// `None` for an empty system, a negative or non-finite weight, or weights that sum to
    /// zero. The first `trace_from` iterations of every orbit are not emitted.
    pub fn new(functions: Vec<IfsFunction>, trace_from: usize) -> Option<Self> {
        if functions.iter().any(|f| !f.weight.is_finite() || f.weight < 0.0) {
            return None;
        }

        let cumulative: Vec<f32> = functions
            .iter()
            .scan(0.0, |sum, f| {
                *sum += f.weight;
                Some(*sum)
            })
            .collect();
        match cumulative.last() {
            Some(&total) if total > 0.0 && total.is_finite() => Some(Self { functions, cumulative, trace_from }),
            _ => None,
        }
    }

    pub fn functions(&self) -> &[IfsFunction] {
        &self.functions
    }

    pub fn trace_from(&self) -> usize {
        self.trace_from
    }

    fn total_weight(&self) -> f32 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Picks the first function whose running weight sum exceeds a uniform draw, the last
    /// one if rounding leaves the draw above every sum.
    pub fn random_function<R: Rng + ?Sized>(&self, rng: &mut R) -> &IfsFunction {
        let draw = rng.gen::<f32>() * self.total_weight();
        let index = self.cumulative.partition_point(|&sum| sum <= draw);
        &self.functions[index.min(self.functions.len() - 1)]
    }

    /// The unbounded chaos game starting from `start`.
    pub fn orbit<R: Rng>(&self, rng: R, start: WorldPoint) -> Orbit<'_, R> {
        Orbit { ifs: self, rng, point: start, iteration: 0, cancel: None }
    }

    /// Runs `samples` independent orbits of `points_per_sample` points each on their own
    /// threads, orbit `i` seeded with `seed + i`. Points arrive through a channel holding
    /// at most `capacity` of them. Points of one orbit keep their order, orbits interleave
    /// arbitrarily.
    pub fn sample_parallel(&self, samples: usize, points_per_sample: usize, seed: u64, capacity: usize) -> ParallelSampler {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        let cancel = CancellationToken::new();

        for index in 0..samples {
            let (ifs, sender, cancel) = (self.clone(), sender.clone(), cancel.clone());
            let spawned = thread::Builder::new().name(format!("ifs-sample-{}", index)).spawn(move || {
                let rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                let orbit = ifs.orbit(rng, WorldPoint::origin()).with_cancellation(cancel);
                for point in orbit.take(points_per_sample) {
                    if sender.send(point).is_err() {
                        log::debug!("ifs sample {} stopped, the consumer hung up", index);
                        return;
                    }
                }
            });
            if let Err(err) = spawned {
                log::warn!("failed to start ifs sample {}: {}", index, err);
            }
        }

        ParallelSampler { receiver, cancel }
    }
}

/// A lazily played chaos game. Emits the running point after each map once the warm-up of
/// [`Ifs::trace_from`] iterations is over.
pub struct Orbit<'a, R> {
    ifs: &'a Ifs,
    rng: R,
    point: WorldPoint,
    iteration: usize,
    cancel: Option<CancellationToken>,
}

impl<'a, R> Orbit<'a, R> {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }
}

impl<'a, R: Rng> Iterator for Orbit<'a, R> {
    type Item = ColoredPoint;

    fn next(&mut self) -> Option<ColoredPoint> {
        loop {
            if self.cancel.as_ref().map_or(false, CancellationToken::is_cancelled) {
                return None;
            }

            let function = self.ifs.random_function(&mut self.rng);
            self.point = function.transform.transform(self.point);
            self.iteration += 1;
            if self.iteration > self.ifs.trace_from {
                return Some(ColoredPoint { position: self.point, color: function.color });
            }
        }
    }
}

/// Consumer side of [`Ifs::sample_parallel`]. Ends once every worker is done, dropping it
/// stops the workers at their next point.
pub struct ParallelSampler {
    receiver: Receiver<ColoredPoint>,
    cancel: CancellationToken,
}

impl ParallelSampler {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Iterator for ParallelSampler {
    type Item = ColoredPoint;

    fn next(&mut self) -> Option<ColoredPoint> {
        self.receiver.recv().ok()
    }
}

impl Drop for ParallelSampler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
