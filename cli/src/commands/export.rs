use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use vulnmap::{Dashboard, read_score_table};

use crate::cli::{Cli, ExportArgs};

pub fn run(_cli: &Cli, args: &ExportArgs) -> Result<()> {
    let schema = args.source.schema();
    let out_path = args.output.clone().unwrap_or_else(|| PathBuf::from("./scores.csv"));

    let table = read_score_table(&args.source.scores, &schema)
        .with_context(|| format!("[export] failed to read {}", args.source.scores.display()))?;
    let dashboard = Dashboard::new(Arc::new(table));

    let rows = dashboard.export_csv(args.top, &schema, &out_path)
        .with_context(|| format!("[export] failed to write {}", out_path.display()))?;
    println!("[export] wrote {rows} rows to {}", out_path.display());

    Ok(())
}
