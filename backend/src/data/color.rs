/// Linear RGBA color with float channels in `[0, 1]`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Source-over composition of `self` onto `dst`, `coverage` scales the source alpha.
    pub fn blend_over(self, dst: Color, coverage: f32) -> Color {
        let alpha = (self.a * coverage).clamp(0.0, 1.0);
        let out_a = alpha + dst.a * (1.0 - alpha);
        if out_a <= 0.0 {
            return Color::TRANSPARENT;
        }

        let mix = |s: f32, d: f32| (s * alpha + d * dst.a * (1.0 - alpha)) / out_a;
        Color::new(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b), out_a)
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba8(&self) -> Rgba8 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        Rgba8(channel(self.r) << 24 | channel(self.g) << 16 | channel(self.b) << 8 | channel(self.a))
    }
}

impl From<Rgba8> for Color {
    fn from(rgba: Rgba8) -> Self {
        let channel = |v: u8| v as f32 / 255.0;
        Color::new(channel(rgba.r()), channel(rgba.g()), channel(rgba.b()), channel(rgba.a()))
    }
}

/// Packed `0xRRGGBBAA` form used when the canvas is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8(pub u32);

impl Rgba8 {
    pub fn r(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn g(&self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn b(&self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn a(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        // from_str_radix alone would take a sign
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Rgba8(value << 8 | 0xff)),
            8 => Some(Rgba8(value)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:08x}", self.0)
    }
}
