//! CSV writing operations.

use std::{fs::File, path::Path};

use polars::{frame::DataFrame, io::SerWriter, prelude::{Column, CsvWriter, NamedFrom}, series::Series};

use crate::{
    Result,
    table::{ScoreRecord, ScoreStats, TableSchema},
};

/// Round to two decimal places, the precision of exported scores.
pub fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    CsvWriter::new(file).finish(df)?;
    Ok(())
}

/// Write a DataFrame to a CSV string.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(df)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Scored rows as a DataFrame: key, score rounded to two decimals and, when
/// `stats` is given, the quartile bucket of each score.
pub(crate) fn scores_frame(records: &[&ScoreRecord], stats: Option<&ScoreStats>, schema: &TableSchema) -> Result<DataFrame> {
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    let scores: Vec<f64> = records.iter().map(|r| round2(r.score)).collect();

    let mut columns: Vec<Column> = vec![
        Series::new(schema.key.as_str().into(), keys).into(),
        Series::new(schema.score.as_str().into(), scores).into(),
    ];
    if let Some(stats) = stats {
        let quartiles: Vec<u32> = records.iter().map(|r| stats.quartile(r.score) as u32).collect();
        columns.push(Series::new("quartile".into(), quartiles).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Write scored rows to a CSV file.
pub fn write_scores(records: &[&ScoreRecord], stats: Option<&ScoreStats>, schema: &TableSchema, path: &Path) -> Result<()> {
    write_csv(&mut scores_frame(records, stats, schema)?, path)
}

/// Write scored rows to a CSV string.
pub fn write_scores_string(records: &[&ScoreRecord], stats: Option<&ScoreStats>, schema: &TableSchema) -> Result<String> {
    write_csv_string(&mut scores_frame(records, stats, schema)?)
}
