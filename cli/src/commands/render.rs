use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::warn;
use vulnmap::{Dashboard, RenderConfig, SourceCache};

use crate::cli::{Cli, RenderArgs};

/// Config file (if any) with command-line flags applied on top.
fn render_config(args: &RenderArgs, dashboard: &Dashboard) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)
            .with_context(|| format!("[render] failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if args.min.is_some() || args.max.is_some() {
        // A single bound is completed from the data extent.
        let extent = dashboard.table().extent();
        let (Some(min), Some(max)) = (args.min.or(extent.map(|r| r.min)), args.max.or(extent.map(|r| r.max))) else {
            bail!("[render] --min/--max given but the score table is empty");
        };
        config = config.with_range(min, max).context("[render] invalid score range")?;
    }
    if let Some(mode) = args.mode { config.mode = mode }
    if let Some(palette) = args.palette { config.palette = palette }
    if let Some(policy) = args.multipolygon { config.multipolygon = policy }
    if let Some(policy) = args.duplicates { config.duplicates = policy }
    Ok(config)
}

pub fn run(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let schema = args.source.schema();
    let key_field = args.key_field.clone().unwrap_or_else(|| schema.key.clone());
    let out_path = args.output.clone().unwrap_or_else(|| PathBuf::from("./map.geojson"));

    println!("[render] loading scores from {}", args.source.scores.display());
    let cache = SourceCache::new();
    let dashboard = Dashboard::open(&cache, &args.source.scores, args.geometry.as_deref(), &schema, &key_field)
        .context("[render] failed to load sources")?;

    let config = render_config(args, &dashboard)?;
    let render = dashboard.render(&config).context("[render] failed to build features")?;

    for err in &render.report.errors { warn!("{err}") }
    println!("[render] {}", render.summary);
    if cli.verbose > 0 {
        println!(
            "[render] {} features, {} errors, {} unmatched geometry, {} unmatched records, {} duplicate keys",
            render.summary.rendered,
            render.report.errors.len(),
            render.report.unmatched_features.len(),
            render.report.unmatched_records.len(),
            render.report.duplicate_keys.len(),
        );
        if let Some(view) = render.view {
            println!("[render] view centred on ({:.4}, {:.4})", view.longitude, view.latitude);
        }
    }

    println!("[render] writing features to {}", out_path.display());
    render.write_geojson(&key_field, &out_path)
        .with_context(|| format!("[render] failed to write {}", out_path.display()))?;

    Ok(())
}
