//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path, sync::Arc};

use polars::{
    frame::DataFrame,
    io::SerReader,
    prelude::{Column, CsvReadOptions, CsvReader, DataType, Field, Schema, SchemaRef},
};
use tracing::{debug, warn};

use crate::{
    Error, RecordError, Result,
    geom::RawGeometry,
    table::{ScoreRecord, ScoreTable, TableSchema},
};

/// Reads a score table from the CSV file at `path`.
pub fn read_score_table(path: &Path, schema: &TableSchema) -> Result<ScoreTable> {
    let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
    let df = CsvReader::new(file).with_options(read_options(schema)).finish()?;
    debug!(path = %path.display(), rows = df.height(), "read score csv");
    score_table_from_frame(&df, schema)
}

/// Reads a score table from CSV text.
pub fn read_score_table_str(csv: &str, schema: &TableSchema) -> Result<ScoreTable> {
    read_score_table_bytes(csv.as_bytes(), schema)
}

/// Reads a score table from CSV bytes already in memory.
pub fn read_score_table_bytes(bytes: &[u8], schema: &TableSchema) -> Result<ScoreTable> {
    let df = CsvReader::new(Cursor::new(bytes)).with_options(read_options(schema)).finish()?;
    score_table_from_frame(&df, schema)
}

/// Read the key column as text so keys like `0110` or `1.50` survive verbatim.
fn read_options(schema: &TableSchema) -> CsvReadOptions {
    CsvReadOptions::default().with_schema_overwrite(Some(key_schema(schema)))
}

fn key_schema(schema: &TableSchema) -> SchemaRef {
    Arc::new(Schema::from_iter([Field::new(schema.key.as_str().into(), DataType::String)]))
}

/// Build a score table from a DataFrame.
///
/// The key and score columns are required. Geometry and longitude/latitude
/// columns are picked up when present. Rows with a null key or a null or
/// non-finite score are rejected and listed in `ScoreTable::rejected`.
pub(crate) fn score_table_from_frame(df: &DataFrame, schema: &TableSchema) -> Result<ScoreTable> {
    let keys = required(df, &schema.key)?.cast(&DataType::String)?;
    let scores = required(df, &schema.score)?.cast(&DataType::Float64)?;
    let geoms = optional(df, &schema.geometry).map(|c| c.cast(&DataType::String)).transpose()?;
    let lons = optional(df, &schema.longitude).map(|c| c.cast(&DataType::Float64)).transpose()?;
    let lats = optional(df, &schema.latitude).map(|c| c.cast(&DataType::Float64)).transpose()?;

    let keys: Vec<Option<&str>> = keys.str()?.into_iter().collect();
    let scores: Vec<Option<f64>> = scores.f64()?.into_iter().collect();
    let geoms: Option<Vec<Option<&str>>> = match &geoms {
        Some(c) => Some(c.str()?.into_iter().collect()),
        None => None,
    };
    let positions: Option<Vec<Option<(f64, f64)>>> = match (&lons, &lats) {
        (Some(lon), Some(lat)) => Some(
            lon.f64()?.into_iter()
                .zip(lat.f64()?.into_iter())
                .map(|(x, y)| x.zip(y))
                .collect()
        ),
        _ => None,
    };

    let mut records = Vec::with_capacity(df.height());
    let mut rejected = Vec::new();
    for (row, (key, score)) in keys.into_iter().zip(scores).enumerate() {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            rejected.push(RecordError::new(format!("row {row}"), Error::MissingKey(schema.key.clone())));
            continue;
        };
        let Some(score) = score.filter(|s| s.is_finite()) else {
            rejected.push(RecordError::new(key, Error::NonFiniteScore { key: key.to_string() }));
            continue;
        };

        let mut record = ScoreRecord::new(key, score);
        record.geometry = geoms.as_ref()
            .and_then(|g| g[row])
            .filter(|g| !g.trim().is_empty())
            .map(|g| RawGeometry::Wkt(g.to_string()));
        record.position = positions.as_ref().and_then(|p| p[row]);
        records.push(record);
    }

    if !rejected.is_empty() {
        warn!(rejected = rejected.len(), "dropped score rows with missing key or score");
    }
    Ok(ScoreTable::new(records).with_rejected(rejected))
}

fn required<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| Error::MissingColumn(name.to_string()))
}

fn optional<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.column(name).ok()
}
