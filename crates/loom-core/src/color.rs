use std::fmt;

/// Non-premultiplied sRGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const TRANSPARENT: Color = Color(0, 0, 0, 0);
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(r, g, b, 255)
    }

    /// `0xRRGGBB`, fully opaque.
    pub const fn rgb(c: u32) -> Self {
        Color((c >> 16) as u8, (c >> 8) as u8, c as u8, 255)
    }

    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim_start_matches('#');
        let byte = |i: usize, default: u8| {
            s.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .unwrap_or(default)
        };
        match s.len() {
            6 => Color(byte(0, 0), byte(2, 0), byte(4, 0), 255),
            8 => Color(byte(0, 0), byte(2, 0), byte(4, 0), byte(6, 255)),
            _ => Color::BLACK,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Color(self.0, self.1, self.2, a)
    }

    /// Scales the RGB channels by `f`, keeping alpha.
    pub fn darken(self, f: f32) -> Self {
        let m = |c: u8| (c as f32 * f.clamp(0.0, 1.0)).round() as u8;
        Color(m(self.0), m(self.1), m(self.2), self.3)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.0, self.1, self.2, self.3]
    }

    pub fn from_bytes(b: [u8; 4]) -> Self {
        Color(b[0], b[1], b[2], b[3])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.0, self.1, self.2, self.3
        )
    }
}
