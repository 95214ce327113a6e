use anyhow::{Context, Result};
use vulnmap::{ColorMapper, ScoreRange};

use crate::cli::{Cli, ColorArgs};

pub fn run(_cli: &Cli, args: &ColorArgs) -> Result<()> {
    let range = ScoreRange::new(args.min, args.max).context("[color] invalid score range")?;
    let color = ColorMapper::new(range, args.mode, args.palette).map(args.score);
    let [r, g, b, a] = color.to_array();
    println!("[{r}, {g}, {b}, {a}] {}", color.to_hex());
    Ok(())
}
