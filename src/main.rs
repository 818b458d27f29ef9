//! Rupture explorer CLI.
//!
//! Search a rupture catalogue, inspect per-fault magnitude and rate
//! attribution, and export maps and tables.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use rupture_explorer::attribution::aggregate_magnitude;
use rupture_explorer::catalogue::{InMemoryCatalogue, RuptureFilter};
use rupture_explorer::explorer::{ExplorerConfig, ExplorerError, RuptureExplorer};
use rupture_explorer::export::export_layer_geojson;
use rupture_explorer::geometry::{IdentityProjector, NztmToWgs84, Projector};
use rupture_explorer::render::format_rate;
use rupture_explorer::rupture::RuptureId;
use rupture_explorer::scaling::{MagnitudeEstimator, SlipRegime};
use rupture_explorer::RatePolicyKind;

/// Earthquake rupture explorer.
#[derive(Parser)]
#[command(name = "rupture-explorer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rupture catalogue (JSON).
    #[arg(short, long, global = true)]
    catalogue: Option<PathBuf>,

    /// Explorer configuration (JSON); missing fields take defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured rate attribution policy.
    #[arg(long, global = true)]
    policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search ruptures by fault name, magnitude, rate and fault count.
    Search {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the summary panel for one rupture.
    Show {
        /// Rupture id.
        id: RuptureId,
    },
    /// Print per-fault magnitudes and attributed rates for one rupture.
    Attribute {
        /// Rupture id.
        id: RuptureId,
    },
    /// Export a rupture's fault map as GeoJSON.
    Map {
        /// Rupture id.
        id: RuptureId,

        /// Output file.
        #[arg(short, long, default_value = "rupture.geojson")]
        output: PathBuf,

        /// Coordinate transform applied to fault geometry.
        #[arg(long, default_value = "nztm")]
        projection: ProjectionArg,
    },
    /// Export search results.
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output file.
        #[arg(short, long)]
        output: PathBuf,

        /// Export format.
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },
    /// List every fault name in the catalogue.
    Faults,
    /// Estimate a magnitude from rupture area and rake.
    Estimate {
        /// Total rupture area in km².
        #[arg(long)]
        area: f64,

        /// Rake in degrees.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        rake: f64,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Free-text terms matched against fault names.
    query: Vec<String>,

    /// Minimum magnitude.
    #[arg(long)]
    min_mag: Option<f64>,

    /// Maximum magnitude.
    #[arg(long)]
    max_mag: Option<f64>,

    /// Minimum rate as a base-10 exponent (e.g. -6 for 1e-6 per year).
    #[arg(long, allow_hyphen_values = true)]
    min_rate_exp: Option<f64>,

    /// Maximum rate as a base-10 exponent.
    #[arg(long, allow_hyphen_values = true)]
    max_rate_exp: Option<f64>,

    /// Maximum number of faults per rupture.
    #[arg(long)]
    max_faults: Option<usize>,

    /// Maximum number of results.
    #[arg(short, long)]
    limit: Option<usize>,
}

impl FilterArgs {
    fn to_filter(&self) -> RuptureFilter {
        RuptureFilter::new(self.query.join(" "))
            .with_magnitude_bounds(self.min_mag, self.max_mag)
            .with_rate_exponents(self.min_rate_exp, self.max_rate_exp)
            .with_fault_count_limit(self.max_faults)
            .with_limit(self.limit)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Split the rate across faults by plane count.
    EvenPerPlane,
    /// Give the rate to the faults best matching their frequency targets.
    FrequencyMatched,
}

impl From<PolicyArg> for RatePolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::EvenPerPlane => RatePolicyKind::EvenPerPlane,
            PolicyArg::FrequencyMatched => RatePolicyKind::FrequencyMatched,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ProjectionArg {
    /// NZTM2000 easting/northing to WGS84 longitude/latitude.
    Nztm,
    /// Leave coordinates untouched.
    Identity,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Rupture ID, magnitude, area, length and rate.
    Csv,
    /// Rupture ids, one per line.
    Ids,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Estimate { area, rake } => run_estimate(cli.config.as_deref(), *area, *rake),
        _ => load_explorer(&cli).and_then(|explorer| run_command(&cli, &explorer)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn run_command(cli: &Cli, explorer: &RuptureExplorer<InMemoryCatalogue>) -> Result<(), ExplorerError> {
    match &cli.command {
        Commands::Search { filter } => run_search(explorer, &filter.to_filter()),
        Commands::Show { id } => run_show(explorer, *id),
        Commands::Attribute { id } => run_attribute(explorer, *id),
        Commands::Map { id, output, projection } => run_map(explorer, *id, output, *projection),
        Commands::Export { filter, output, format } => run_export(explorer, &filter.to_filter(), output, *format),
        Commands::Faults => run_faults(explorer),
        Commands::Estimate { area, rake } => run_estimate(cli.config.as_deref(), *area, *rake),
    }
}

fn load_config(path: Option<&Path>) -> Result<ExplorerConfig, ExplorerError> {
    match path {
        Some(path) => ExplorerConfig::from_json_file(path),
        None => Ok(ExplorerConfig::default()),
    }
}

fn load_explorer(cli: &Cli) -> Result<RuptureExplorer<InMemoryCatalogue>, ExplorerError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(policy) = cli.policy {
        config.rate_policy = policy.into();
    }

    let Some(path) = cli.catalogue.as_deref() else {
        eprintln!("Error: --catalogue <FILE> is required for this command");
        std::process::exit(1);
    };
    let catalogue = InMemoryCatalogue::from_json_file(path)?;
    Ok(RuptureExplorer::new(catalogue, config))
}

fn run_search(explorer: &RuptureExplorer<InMemoryCatalogue>, filter: &RuptureFilter) -> Result<(), ExplorerError> {
    let results = explorer.search(filter)?;
    println!(
        "{:>10}  {:>5}  {:>8}  {:>9}  {:>9}  {:>7}  Faults",
        "Rupture", "Mw", "Est. Mw", "Rate", "Area", "Length"
    );
    for summary in &results {
        let estimate = summary
            .estimated_magnitude
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>10}  {:>5.2}  {:>8}  {:>9}  {:>9.0}  {:>7.0}  {}",
            summary.id,
            summary.magnitude,
            estimate,
            format_rate(summary.rate),
            summary.area_km2,
            summary.length_km,
            summary.faults
        );
    }
    println!("{} ruptures", results.len());
    Ok(())
}

fn run_show(explorer: &RuptureExplorer<InMemoryCatalogue>, id: RuptureId) -> Result<(), ExplorerError> {
    let panel = explorer.panel(id)?;
    println!("Rupture {}", panel.id);
    println!("  Mean Rate:   {} / yr", panel.rate);
    println!("  Magnitude:   {}", panel.magnitude);
    println!("  Area:        {} km²", panel.area_km2);
    println!("  Length:      {} km", panel.length_km);
    println!("  Faults:      {}", panel.fault_count);
    Ok(())
}

fn run_attribute(explorer: &RuptureExplorer<InMemoryCatalogue>, id: RuptureId) -> Result<(), ExplorerError> {
    let attribution = explorer.attribution(id)?;
    println!("Rupture {} ({:?} policy)", id, attribution.policy);
    for (name, magnitude) in attribution.magnitudes.iter() {
        let rate = attribution.rates.get(name).copied().unwrap_or(0.0);
        println!("  {:<40} Mw {:.2}  rate {}", name, magnitude, format_rate(rate));
    }
    println!("Aggregate magnitude: {:.2}", aggregate_magnitude(&attribution.magnitudes)?);
    Ok(())
}

fn run_map(
    explorer: &RuptureExplorer<InMemoryCatalogue>,
    id: RuptureId,
    output: &Path,
    projection: ProjectionArg,
) -> Result<(), ExplorerError> {
    let projector: Box<dyn Projector> = match projection {
        ProjectionArg::Nztm => Box::new(NztmToWgs84::default()),
        ProjectionArg::Identity => Box::new(IdentityProjector),
    };
    let layer = explorer.rupture_map(id, projector.as_ref())?;
    export_layer_geojson(&layer, output)?;

    println!("Exported {} faults to {}", layer.features.len(), output.display());
    if !layer.dropped.is_empty() {
        println!("  Without geometry: {}", layer.dropped.join(", "));
    }
    if let (Some(min), Some(max)) = (layer.min_rate, layer.max_rate) {
        println!("  Rate scale: {} .. {}", format_rate(min), format_rate(max));
    }
    Ok(())
}

fn run_export(
    explorer: &RuptureExplorer<InMemoryCatalogue>,
    filter: &RuptureFilter,
    output: &Path,
    format: ExportFormat,
) -> Result<(), ExplorerError> {
    let rows = match format {
        ExportFormat::Csv => explorer.export_csv(filter, output)?,
        ExportFormat::Ids => explorer.export_ids(filter, output)?,
    };
    println!("Exported {} ruptures to {}", rows, output.display());
    Ok(())
}

fn run_faults(explorer: &RuptureExplorer<InMemoryCatalogue>) -> Result<(), ExplorerError> {
    for name in explorer.fault_names()? {
        println!("{}", name);
    }
    Ok(())
}

fn run_estimate(config: Option<&Path>, area: f64, rake: f64) -> Result<(), ExplorerError> {
    let config = load_config(config)?;
    let estimator = MagnitudeEstimator::new(config.scaling);

    let magnitude = estimator.magnitude_from_area(area, rake)?;
    let moment = estimator.magnitude_to_moment(magnitude)?;
    println!("Regime:    {:?}", SlipRegime::from_rake(rake));
    println!("Magnitude: {:.2}", magnitude);
    println!("Moment:    {:.3e} N·m", moment);
    Ok(())
}
