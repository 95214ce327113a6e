//! Score-to-color mapping.

mod mapper;
mod palette;
mod range;
mod rgba;

pub use mapper::{ColorMapper, ColorMode, EMPHASIS_EXPONENT, map_score};
pub use palette::Palette;
pub use range::ScoreRange;
pub use rgba::Rgba;
