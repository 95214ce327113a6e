//! Named palettes mapping a normalized value in [0, 1] to a color.
//!
//! The perceptual ramps are nine evenly spaced control points sampled from the
//! matplotlib colormaps of the same name, interpolated linearly in sRGB.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, color::Rgba};

/// Palette identifier, selectable by string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Palette {
    /// Two-channel ramp: red rises with the score, green falls.
    #[default]
    #[serde(alias = "red-green")]
    LinearRedGreen,
    Viridis,
    Inferno,
    Magma,
    Plasma,
    Cividis,
}

impl Palette {
    pub const ALL: [Palette; 6] = [
        Palette::LinearRedGreen,
        Palette::Viridis,
        Palette::Inferno,
        Palette::Magma,
        Palette::Plasma,
        Palette::Cividis,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Palette::LinearRedGreen => "linear-red-green",
            Palette::Viridis => "viridis",
            Palette::Inferno => "inferno",
            Palette::Magma => "magma",
            Palette::Plasma => "plasma",
            Palette::Cividis => "cividis",
        }
    }

    /// Sample the palette at `t` (clamped to [0, 1]).
    pub fn sample(self, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        match self {
            Palette::LinearRedGreen => {
                // Truncating cast keeps red + green == 255.
                let red = (255.0 * t) as u8;
                Rgba::opaque(red, 255 - red, 0)
            }
            Palette::Viridis => interpolate(&VIRIDIS, t),
            Palette::Inferno => interpolate(&INFERNO, t),
            Palette::Magma => interpolate(&MAGMA, t),
            Palette::Plasma => interpolate(&PLASMA, t),
            Palette::Cividis => interpolate(&CIVIDIS, t),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Palette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase().replace('_', "-");
        match id.as_str() {
            "linear-red-green" | "red-green" | "linear" => Ok(Palette::LinearRedGreen),
            "viridis" => Ok(Palette::Viridis),
            "inferno" => Ok(Palette::Inferno),
            "magma" => Ok(Palette::Magma),
            "plasma" => Ok(Palette::Plasma),
            "cividis" => Ok(Palette::Cividis),
            _ => Err(Error::UnknownPalette(s.to_string())),
        }
    }
}

/// Linear interpolation between evenly spaced control points, rounded per channel.
fn interpolate(stops: &[[u8; 3]], t: f64) -> Rgba {
    match stops.len() {
        0 => return Rgba::NEUTRAL,
        1 => return Rgba::opaque(stops[0][0], stops[0][1], stops[0][2]),
        _ => {}
    }
    let scaled = t * (stops.len() - 1) as f64;
    let lo = (scaled as usize).min(stops.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (stops[lo], stops[lo + 1]);
    let lerp = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8;
    Rgba::opaque(lerp(0), lerp(1), lerp(2))
}

const VIRIDIS: [[u8; 3]; 9] = [
    [0x44, 0x01, 0x54], // dark purple
    [0x47, 0x2c, 0x7a],
    [0x3b, 0x51, 0x8b],
    [0x2c, 0x71, 0x8e],
    [0x21, 0x90, 0x8d], // teal
    [0x27, 0xad, 0x81],
    [0x5c, 0xc8, 0x63],
    [0xaa, 0xdc, 0x32],
    [0xfd, 0xe7, 0x25], // yellow
];

const INFERNO: [[u8; 3]; 9] = [
    [0x00, 0x00, 0x04],
    [0x1f, 0x0c, 0x48],
    [0x55, 0x0f, 0x6d],
    [0x88, 0x22, 0x6a],
    [0xba, 0x36, 0x55],
    [0xe3, 0x59, 0x33],
    [0xf9, 0x8e, 0x09],
    [0xf9, 0xcb, 0x35],
    [0xfc, 0xff, 0xa4],
];

const MAGMA: [[u8; 3]; 9] = [
    [0x00, 0x00, 0x04],
    [0x1c, 0x10, 0x44],
    [0x4f, 0x12, 0x7b],
    [0x81, 0x25, 0x81],
    [0xb5, 0x36, 0x7a],
    [0xe5, 0x50, 0x64],
    [0xfb, 0x87, 0x61],
    [0xfe, 0xc2, 0x87],
    [0xfc, 0xfd, 0xbf],
];

const PLASMA: [[u8; 3]; 9] = [
    [0x0d, 0x08, 0x87],
    [0x4c, 0x02, 0xa1],
    [0x7e, 0x03, 0xa8],
    [0xa9, 0x23, 0x95],
    [0xcc, 0x47, 0x78],
    [0xe6, 0x6c, 0x5c],
    [0xf8, 0x95, 0x40],
    [0xfd, 0xc5, 0x27],
    [0xf0, 0xf9, 0x21],
];

const CIVIDIS: [[u8; 3]; 9] = [
    [0x00, 0x22, 0x4e],
    [0x12, 0x35, 0x70],
    [0x3b, 0x49, 0x6c],
    [0x57, 0x5d, 0x6d],
    [0x70, 0x71, 0x73],
    [0x8a, 0x87, 0x79],
    [0xa6, 0x9d, 0x75],
    [0xc4, 0xb5, 0x6c],
    [0xfe, 0xe8, 0x38],
];
