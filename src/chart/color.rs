//! Dataset colours and palettes.

use std::fmt;

use serde::{Serialize, Serializer};

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Colour from hue (degrees), saturation and lightness (0..=1).
    pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = lightness - c / 2.0;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }

    /// The same colour with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS notation, `rgb(..)` when opaque and `rgba(..)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

/// How dataset colours are chosen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Palette {
    /// Evenly spaced hues, `hsl(i * 360 / n, 70%, 60%)`.
    #[default]
    Spread,
    /// A fixed list of colours, repeated when there are more datasets.
    Cycle(Vec<Color>),
}

impl Palette {
    /// Colour for the `index`-th of `count` datasets.
    pub fn color(&self, index: usize, count: usize) -> Color {
        match self {
            Palette::Cycle(colors) if !colors.is_empty() => colors[index % colors.len()],
            _ => Color::hsl(index as f64 * 360.0 / count.max(1) as f64, 0.7, 0.6),
        }
    }

    /// Colours for `count` datasets.
    pub fn colors(&self, count: usize) -> Vec<Color> {
        (0..count).map(|i| self.color(i, count)).collect()
    }
}
