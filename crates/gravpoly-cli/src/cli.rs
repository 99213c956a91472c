use clap::{Args, Parser, Subcommand};
use gravpoly_core::config::CliConfigOverrides;
use gravpoly_core::models::MutationStrategy;
use gravpoly_core::units::GravityUnit;
use std::path::PathBuf;

/// gravpoly - 2-D gravity modelling and polygon inversion
#[derive(Parser, Debug)]
#[command(name = "gravpoly")]
#[command(about = "2-D gravity modelling and polygon inversion", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./gravpoly.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the gravity anomaly of a polygonal body
    Forward(ForwardArgs),

    /// Resample a profile onto a uniform grid
    Resample(ResampleArgs),

    /// Invert a profile for a polygonal body
    Invert(InvertArgs),

    /// Show a saved model file
    Inspect(InspectArgs),

    /// Show effective configuration values and their sources
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ForwardArgs {
    /// Body vertex as `x,z` in metres (z positive down); repeat for each vertex
    #[arg(long = "vertex", value_name = "X,Z", required = true, allow_hyphen_values = true, value_parser = parse_vertex)]
    pub vertices: Vec<(f64, f64)>,

    /// Density contrast in kg/m^3
    #[arg(long)]
    pub density: Option<f64>,

    /// Compare against this profile, modelling on a grid spanning it
    #[arg(long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Number of grid points when a profile is given
    #[arg(long)]
    pub points: Option<usize>,

    /// Gravity unit used in the profile file
    #[arg(long, value_enum, default_value = "mgal")]
    pub gravity_unit: GravityUnitArg,

    /// Print the value at every grid point
    #[arg(long)]
    pub show_points: bool,
}

#[derive(Parser, Debug)]
pub struct ResampleArgs {
    /// Profile file (distance km, gravity)
    pub profile: PathBuf,

    /// Number of evenly spaced output points
    #[arg(long)]
    pub points: Option<usize>,

    /// Target residual sum of squares for the smoothing spline (0 interpolates)
    #[arg(long)]
    pub smoothing: Option<f64>,

    /// Gravity unit used in the profile file
    #[arg(long, value_enum, default_value = "mgal")]
    pub gravity_unit: GravityUnitArg,

    /// Print the value at every grid point
    #[arg(long)]
    pub show_points: bool,
}

#[derive(Parser, Debug)]
pub struct InvertArgs {
    /// Profile file (distance km, gravity)
    pub profile: PathBuf,

    /// Save the recovered model as JSON
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Gravity unit used in the profile file
    #[arg(long, value_enum, default_value = "mgal")]
    pub gravity_unit: GravityUnitArg,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrideArgs,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Model file written by `gravpoly invert --output`
    pub model: PathBuf,

    /// Print observed and modelled values at every grid point
    #[arg(long)]
    pub show_points: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrideArgs,
}

/// Per-run overrides of the layered configuration
#[derive(Args, Debug, Default)]
pub struct ConfigOverrideArgs {
    /// Density contrast in kg/m^3
    #[arg(long)]
    pub density: Option<f64>,

    /// Deepest allowed vertex in metres
    #[arg(long)]
    pub max_depth: Option<f64>,

    /// Number of polygon vertices to recover
    #[arg(long = "n-vertices")]
    pub n_vertices: Option<usize>,

    /// Points in the observation grid
    #[arg(long)]
    pub grid_points: Option<usize>,

    /// Target residual sum of squares for the smoothing spline
    #[arg(long)]
    pub smoothing: Option<f64>,

    /// Population size as a multiple of the number of coordinates
    #[arg(long)]
    pub population_size: Option<usize>,

    #[arg(long)]
    pub max_generations: Option<usize>,

    /// Relative convergence tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,

    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Wall-clock limit in seconds
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<u64>,
}

impl From<ConfigOverrideArgs> for CliConfigOverrides {
    fn from(args: ConfigOverrideArgs) -> Self {
        CliConfigOverrides {
            density: args.density,
            max_depth: args.max_depth,
            n_vertices: args.n_vertices,
            grid_points: args.grid_points,
            smoothing: args.smoothing,
            population_size: args.population_size,
            max_generations: args.max_generations,
            tolerance: args.tolerance,
            strategy: args.strategy.map(Into::into),
            seed: args.seed,
            time_limit_secs: args.time_limit,
        }
    }
}

/// Differential-evolution mutation strategy
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrategyArg {
    /// Mutate around the best member
    Best1bin,
    /// Mutate around a random member
    Rand1bin,
}

impl From<StrategyArg> for MutationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Best1bin => MutationStrategy::Best1Bin,
            StrategyArg::Rand1bin => MutationStrategy::Rand1Bin,
        }
    }
}

/// Gravity unit of profile files
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum GravityUnitArg {
    /// Milligals
    Mgal,
    /// Gravity units (0.1 mGal)
    Gu,
}

impl From<GravityUnitArg> for GravityUnit {
    fn from(arg: GravityUnitArg) -> Self {
        match arg {
            GravityUnitArg::Mgal => GravityUnit::Milligal,
            GravityUnitArg::Gu => GravityUnit::GravityUnit,
        }
    }
}

fn parse_vertex(s: &str) -> Result<(f64, f64), String> {
    let (x, z) = s.split_once(',').ok_or_else(|| format!("expected X,Z but got '{}'", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("invalid x '{}': {}", x, e))?;
    let z = z.trim().parse::<f64>().map_err(|e| format!("invalid z '{}': {}", z, e))?;
    Ok((x, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vertex() {
        assert_eq!(parse_vertex("2000,0").unwrap(), (2000.0, 0.0));
        assert_eq!(parse_vertex(" -1500.5 , 300 ").unwrap(), (-1500.5, 300.0));
        assert!(parse_vertex("2000").is_err());
        assert!(parse_vertex("a,1").is_err());
    }

    #[test]
    fn test_parse_forward_command() {
        let cli = Cli::try_parse_from([
            "gravpoly", "forward", "--vertex", "2000,0", "--vertex", "-6000,0", "--vertex",
            "4000,3000", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Forward(args) => {
                assert_eq!(args.vertices.len(), 3);
                assert_eq!(args.vertices[1], (-6000.0, 0.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_overrides_convert() {
        let cli = Cli::try_parse_from([
            "gravpoly", "invert", "profile.csv", "--n-vertices", "4", "--strategy", "rand1bin",
            "--time-limit", "30",
        ])
        .unwrap();
        let Commands::Invert(args) = cli.command else { panic!("expected invert") };
        let overrides = CliConfigOverrides::from(args.overrides);
        assert_eq!(overrides.n_vertices, Some(4));
        assert_eq!(overrides.strategy, Some(MutationStrategy::Rand1Bin));
        assert_eq!(overrides.time_limit_secs, Some(30));
        assert_eq!(overrides.density, None);
    }

    #[test]
    fn test_vertex_count_flag_matches_config_key() {
        let cli = Cli::try_parse_from(["gravpoly", "invert", "profile.csv", "--n-vertices", "5"])
            .unwrap();
        let Commands::Invert(args) = cli.command else { panic!("expected invert") };
        assert_eq!(args.overrides.n_vertices, Some(5));

        assert!(Cli::try_parse_from(["gravpoly", "invert", "profile.csv", "--vertices", "5"])
            .is_err());
    }
}
