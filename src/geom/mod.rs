//! Polygon geometry and its normalization.

mod normalize;
mod shape;

pub use normalize::{GeometryNormalizer, MultiPolygonPolicy, RawGeometry, flatten_outer_rings};
pub use shape::{Geometry, Polygon};
