use std::{ collections::HashMap, str::Chars };

use crate::data::prelude::*;

use super::{ CancellationToken, FractalShape };

/// Lindenmayer system with a turtle reading of its symbols:
///
/// | symbol | turtle |
/// |---|---|
/// | `F`, `G` | draw one step forward |
/// | `f` | move one step forward without drawing |
/// | `+` / `-` | turn left / right by the angle |
/// | `|` | turn around |
/// | `[` / `]` | push / pop position and heading |
///
/// Any other symbol only takes part in rewriting.
#[derive(Debug, Clone)]
pub struct LSystem {
    axiom: String,
    rules: HashMap<char, String>,
    angle: f32,
    step: f32,
}

impl LSystem {
    pub fn new<I: IntoIterator<Item = (char, String)>>(axiom: impl Into<String>, rules: I, angle_degrees: f32, step: f32) -> Self {
        Self { axiom: axiom.into(), rules: rules.into_iter().collect(), angle: angle_degrees, step }
    }

    /// Parses rules written as `"F=F+F-F"`, turning by 90 degrees with unit steps.
    ///
    /// `None` for an empty axiom, a rule without `=`, a left side that is not exactly one
    /// symbol, or a symbol with two rules.
    pub fn parse(axiom: &str, rules: &[&str]) -> Option<Self> {
        let axiom = axiom.trim();
        if axiom.is_empty() {
            return None;
        }

        let mut parsed = HashMap::new();
        for rule in rules {
            let (symbol, replacement) = rule.split_once('=')?;
            let mut symbol = symbol.trim().chars();
            let (Some(symbol), None) = (symbol.next(), symbol.next()) else {
                return None;
            };
            if parsed.insert(symbol, replacement.trim().to_string()).is_some() {
                return None;
            }
        }

        Some(Self::new(axiom, parsed, 90.0, 1.0))
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    pub fn rule(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    /// The axiom rewritten `generations` times, produced one symbol at a time without ever
    /// building the whole string.
    pub fn symbols(&self, generations: u32) -> Symbols<'_> {
        Symbols { system: self, generations, stack: vec![(self.axiom.chars(), 0)], cancel: None }
    }

    /// Segments drawn by a turtle starting at `start`, heading `heading_degrees` from +x.
    pub fn turtle(&self, generations: u32, start: WorldPoint, heading_degrees: f32) -> Turtle<'_> {
        Turtle {
            symbols: self.symbols(generations),
            angle: self.angle.to_radians(),
            step: self.step,
            position: start,
            heading: heading_degrees.to_radians(),
            saved: Vec::new(),
            stopped: false,
        }
    }
}

pub struct Symbols<'a> {
    system: &'a LSystem,
    generations: u32,
    stack: Vec<(Chars<'a>, u32)>,
    cancel: Option<CancellationToken>,
}

impl<'a> Symbols<'a> {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

impl<'a> Iterator for Symbols<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if self.cancel.as_ref().map_or(false, CancellationToken::is_cancelled) {
            self.stack.clear();
            return None;
        }

        loop {
            let (chars, depth) = self.stack.last_mut()?;
            let depth = *depth;
            match chars.next() {
                None => {
                    self.stack.pop();
                }
                Some(symbol) => match self.system.rules.get(&symbol) {
                    Some(replacement) if depth < self.generations => {
                        self.stack.push((replacement.chars(), depth + 1));
                    }
                    _ => return Some(symbol),
                },
            }
        }
    }
}

pub struct Turtle<'a> {
    symbols: Symbols<'a>,
    angle: f32,
    step: f32,
    position: WorldPoint,
    heading: f32,
    saved: Vec<(WorldPoint, f32)>,
    stopped: bool,
}

impl<'a> Turtle<'a> {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.symbols = self.symbols.with_cancellation(token);
        self
    }

    fn advance(&mut self) -> WorldPoint {
        let (sin, cos) = self.heading.sin_cos();
        self.position += WorldVector::new(cos, sin) * self.step;
        self.position
    }
}

impl<'a> Iterator for Turtle<'a> {
    type Item = FractalShape;

    fn next(&mut self) -> Option<FractalShape> {
        if self.stopped {
            return None;
        }

        while let Some(symbol) = self.symbols.next() {
            match symbol {
                'F' | 'G' => {
                    let from = self.position;
                    return Some(FractalShape::Line(from, self.advance()));
                }
                'f' => {
                    self.advance();
                }
                '+' => self.heading += self.angle,
                '-' => self.heading -= self.angle,
                '|' => self.heading += std::f32::consts::PI,
                '[' => self.saved.push((self.position, self.heading)),
                ']' => match self.saved.pop() {
                    Some((position, heading)) => {
                        self.position = position;
                        self.heading = heading;
                    }
                    None => {
                        log::warn!("l-system popped an empty turtle stack, expansion stopped");
                        self.stopped = true;
                        return None;
                    }
                },
                _ => {}
            }
        }
        None
    }
}
