use crate::data::prelude::*;

use super::PixelSink;

pub type UpdateListener = Box<dyn FnMut(u64) + Send>;

/// Fixed-size pixel buffer addressed in world pixel coordinates.
///
/// `(x, y)` lands at buffer index `(x, y) - origin`. Writes that fall outside
/// `[0, width) x [0, height)` are dropped. Every finished write, or every finished outermost
/// [`Canvas::update`] batch, sends one redraw notification to the listener.
pub struct Canvas {
    width: i32,
    height: i32,
    pub origin: PixelPoint,
    background: Color,
    pixels: Vec<Color>,

    batch_depth: u32,
    update_count: u64,
    listener: Option<UpdateListener>,
}

impl Canvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_background(width, height, Color::BLACK)
    }

    pub fn with_background(width: i32, height: i32, background: Color) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            width,
            height,
            origin: PixelPoint::origin(),
            background,
            pixels: vec![background; (width * height) as usize],
            batch_depth: 0,
            update_count: 0,
            listener: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    /// Row-major pixels, row 0 is the lowest `y`.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Centers the origin so world `(0, 0)` sits in the middle of the buffer.
    pub fn center_origin(&mut self) {
        self.origin = PixelPoint::new(-self.width / 2, -self.height / 2);
    }

    pub fn set_update_listener(&mut self, listener: UpdateListener) {
        self.listener = Some(listener);
    }

    /// Number of redraw notifications sent so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (bx, by) = (x - self.origin.x, y - self.origin.y);
        if bx < 0 || by < 0 || bx >= self.width || by >= self.height {
            None
        } else {
            Some((by * self.width + bx) as usize)
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Background color for coordinates outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Color {
        self.index(x, y).map_or(self.background, |i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
        self.notify();
    }

    /// Source-over write where `coverage` scales the color's own alpha.
    pub fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.blend_over(self.pixels[i], coverage);
        }
        self.notify();
    }

    pub fn clear(&mut self) {
        let background = self.background;
        self.pixels.iter_mut().for_each(|p| *p = background);
        self.notify();
    }

    /// Runs `batch` with notifications held back and sends exactly one when the outermost
    /// batch returns, whether or not anything was written.
    ///
    /// A panicking batch still closes its level, so the canvas keeps notifying afterwards.
    pub fn update<R>(&mut self, batch: impl FnOnce(&mut Canvas) -> R) -> R {
        self.batch_depth += 1;
        let mut guard = BatchGuard(self);
        batch(&mut *guard.0)
    }

    fn notify(&mut self) {
        if self.batch_depth > 0 {
            return;
        }

        self.update_count += 1;
        let count = self.update_count;
        if let Some(listener) = self.listener.as_mut() {
            listener(count);
        }
    }

    /// Exports as packed RGBA rows, top row first (+y up on screen).
    pub fn to_rgba8(&self) -> Vec<Rgba8> {
        (0..self.height)
            .rev()
            .flat_map(move |row| {
                let start = (row * self.width) as usize;
                self.pixels[start..start + self.width as usize].iter().map(Color::to_rgba8)
            })
            .collect()
    }

    pub fn sink(&mut self, color: Color) -> CanvasSink<'_> {
        CanvasSink { canvas: self, color }
    }
}

struct BatchGuard<'a>(&'a mut Canvas);

impl<'a> Drop for BatchGuard<'a> {
    fn drop(&mut self) {
        self.0.batch_depth -= 1;
        // no listener calls while unwinding
        if !std::thread::panicking() {
            self.0.notify();
        }
    }
}

/// Adapts a canvas to the [`PixelSink`] contract with a fixed paint color.
pub struct CanvasSink<'a> {
    canvas: &'a mut Canvas,
    color: Color,
}

impl<'a> CanvasSink<'a> {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

impl<'a> PixelSink for CanvasSink<'a> {
    fn plot_pixel(&mut self, x: i32, y: i32) {
        self.canvas.blend(x, y, self.color, 1.0)
    }

    fn plot_pixel_alpha(&mut self, x: i32, y: i32, alpha: f32) {
        self.canvas.blend(x, y, self.color, alpha)
    }
}
