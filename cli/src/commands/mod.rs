pub mod color;
pub mod export;
pub mod render;
pub mod stats;
