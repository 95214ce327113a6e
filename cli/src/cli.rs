use std::path::PathBuf;

use vulnmap::{ColorMode, DuplicatePolicy, MultiPolygonPolicy, Palette, TableSchema};

/// Neighbourhood vulnerability map CLI
#[derive(clap::Parser, Debug)]
#[command(name = "vulnmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Color and merge scores onto geometry, writing a GeoJSON feature collection
    Render(RenderArgs),

    /// Write the score table (or its top N rows) to CSV
    Export(ExportArgs),

    /// Print summary statistics and slider bounds for a score table
    Stats(StatsArgs),

    /// Print the color of a single score
    Color(ColorArgs),
}

/// Score table location and column names.
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// Input score table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub scores: PathBuf,

    /// Name of the key column
    #[arg(long, default_value = "neighbourhood")]
    pub key_column: String,

    /// Name of the score column
    #[arg(long, default_value = "weighted_score")]
    pub score_column: String,
}

impl SourceArgs {
    pub fn schema(&self) -> TableSchema {
        TableSchema {
            key: self.key_column.clone(),
            score: self.score_column.clone(),
            ..TableSchema::default()
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Neighbourhood geometry (GeoJSON FeatureCollection); defaults to the table's WKT column
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub geometry: Option<PathBuf>,

    /// Output feature collection, defaults to "./map.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Feature property holding the key, defaults to the key column name
    #[arg(long)]
    pub key_field: Option<String>,

    /// Render configuration (JSON); flags below override it
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Lower bound of the score filter
    #[arg(long)]
    pub min: Option<f64>,

    /// Upper bound of the score filter
    #[arg(long)]
    pub max: Option<f64>,

    /// standard | emphasized
    #[arg(long)]
    pub mode: Option<ColorMode>,

    /// linear-red-green | viridis | inferno | magma | plasma | cividis
    #[arg(long)]
    pub palette: Option<Palette>,

    /// preserve | flatten
    #[arg(long)]
    pub multipolygon: Option<MultiPolygonPolicy>,

    /// first | last | reject
    #[arg(long)]
    pub duplicates: Option<DuplicatePolicy>,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output CSV, defaults to "./scores.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Only the N highest scores
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ColorArgs {
    pub score: f64,

    #[arg(long)]
    pub min: f64,

    #[arg(long)]
    pub max: f64,

    #[arg(long, default_value = "standard")]
    pub mode: ColorMode,

    #[arg(long, default_value = "linear-red-green")]
    pub palette: Palette,
}
