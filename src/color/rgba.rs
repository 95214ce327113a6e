use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque RGBA color. Alpha is always 255 for colors produced by the mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u8; 4]", from = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque color from three channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Neutral gray used for scores that cannot be placed on a ramp.
    pub const NEUTRAL: Rgba = Rgba::opaque(150, 150, 150);

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Format as `#rrggbb` (alpha dropped).
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self { c.to_array() }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self { Self { r, g, b, a } }
}

impl fmt::Display for Rgba {
    /// Format as CSS: rgba(r,g,b,a) with alpha in [0,1]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{:.2})", self.r, self.g, self.b, self.a as f64 / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Rgba;

    #[test]
    fn hex_and_css() {
        let c = Rgba::opaque(68, 1, 84);
        assert_eq!(c.to_hex(), "#440154");
        assert_eq!(c.to_string(), "rgba(68,1,84,1.00)");
    }

    #[test]
    fn serializes_as_array() {
        let c = Rgba::opaque(127, 128, 0);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[127,128,0,255]");
        let back: Rgba = serde_json::from_str("[127,128,0,255]").unwrap();
        assert_eq!(back, c);
    }
}
