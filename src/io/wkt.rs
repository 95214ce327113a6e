//! WKT reading.

use std::str::FromStr;

use wkt::Wkt;

use crate::{Error, Result, geom::Geometry};

/// Parse a WKT string into a polygonal geometry.
pub(crate) fn parse_wkt(text: &str) -> Result<Geometry> {
    let parsed = Wkt::<f64>::from_str(text.trim())
        .map_err(|e| Error::Parse(format!("[io::wkt] {e}")))?;
    let geom = geo::Geometry::<f64>::try_from(parsed)
        .map_err(|e| Error::Parse(format!("[io::wkt] {e}")))?;
    Geometry::from_geo(geom)
}
