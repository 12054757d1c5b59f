//! mpas-plot
//!
//! Command-line front end for the Hovmöller and humidity profile figures.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mpas_plot::config::PlotConfig;
use mpas_plot::{hovmoller, profile};

/// Diagnostic plots from MPAS unstructured-grid output
#[derive(Parser, Debug)]
#[command(name = "mpas-plot")]
#[command(about = "Hovmöller and relative humidity profile figures from MPAS output")]
struct Args {
    /// YAML configuration file
    #[arg(long, global = true, env = "MPAS_PLOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time–longitude diagram of vertical velocity
    Hovmoller {
        /// Glob matching the diagnostics files
        #[arg(long)]
        pattern: Option<String>,

        /// File holding latCell/lonCell
        #[arg(long)]
        grid_file: Option<PathBuf>,

        /// Field to plot (repeatable); defaults to every configured field
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Directory receiving one PNG per field
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Altitude–time relative humidity over a window
    Profile {
        /// Glob matching the model output files
        #[arg(long)]
        pattern: Option<String>,

        /// Output PNG path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    if let Err(e) = run(args) {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PlotConfig::load(path)?,
        None => {
            info!("No configuration file given, using defaults");
            PlotConfig::default()
        }
    };

    match args.command {
        Command::Hovmoller {
            pattern,
            grid_file,
            fields,
            output_dir,
        } => {
            let mut cfg = config.hovmoller;
            if let Some(pattern) = pattern {
                cfg.pattern = pattern;
            }
            if let Some(grid_file) = grid_file {
                cfg.grid_file = grid_file;
            }
            if let Some(output_dir) = output_dir {
                cfg.output_dir = output_dir;
            }
            let fields = cfg.select_fields(&fields)?;

            info!(pattern = %cfg.pattern, fields = fields.len(), "Building Hovmöller diagrams");
            let written = hovmoller::run(&cfg, &fields).context("Hovmöller run failed")?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Command::Profile { pattern, output } => {
            let mut cfg = config.profile;
            if let Some(pattern) = pattern {
                cfg.pattern = pattern;
            }
            if let Some(output) = output {
                cfg.output = output;
            }

            info!(pattern = %cfg.pattern, window = %cfg.window.name, "Building humidity profile");
            let path = profile::run(&cfg).context("Profile run failed")?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
