use anyhow::{Context, Result};
use vulnmap::read_score_table;

use crate::cli::{Cli, StatsArgs};

pub fn run(_cli: &Cli, args: &StatsArgs) -> Result<()> {
    let table = read_score_table(&args.source.scores, &args.source.schema())
        .with_context(|| format!("[stats] failed to read {}", args.source.scores.display()))?;

    let Some(stats) = table.stats() else {
        println!("[stats] no scored rows in {}", args.source.scores.display());
        return Ok(())
    };
    let duplicates = table.duplicate_keys();

    if args.json {
        let value = serde_json::json!({
            "stats": stats,
            "slider": table.slider_bounds(),
            "rejected": table.rejected.len(),
            "duplicate_keys": duplicates,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(())
    }

    println!("count   {}", stats.count);
    println!("mean    {:.2}", stats.mean);
    println!("std     {:.2}", stats.std);
    println!("min     {:.2}", stats.min);
    println!("25%     {:.2}", stats.q1);
    println!("50%     {:.2}", stats.median);
    println!("75%     {:.2}", stats.q3);
    println!("max     {:.2}", stats.max);
    if let Some(slider) = table.slider_bounds() {
        println!("slider  [{}, {}]", slider.min, slider.max);
    }
    if !table.rejected.is_empty() { println!("rejected rows: {}", table.rejected.len()) }
    if !duplicates.is_empty() { println!("duplicate keys: {}", duplicates.join(", ")) }

    Ok(())
}
