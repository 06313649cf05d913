#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line dashboard for accident hotspots.
//!
//! `hotspot_map analyze` prints one hotspot run, `hotspot_map interactive`
//! explores the parameters in a prompt loop, and `hotspot_map serve` starts
//! the JSON API. Without a subcommand the user picks one interactively.
//!
//! Uses `indicatif-log-bridge` (via [`hotspot_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the load spinner never fight for the terminal.

mod interactive;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dialoguer::Select;
use hotspot_map_accident_models::TimeWindow;
use hotspot_map_cli_utils::{IndicatifProgress, MultiProgress};
use hotspot_map_hotspot::Dashboard;
use hotspot_map_hotspot::config::DashboardConfig;
use hotspot_map_server::BindConfig;
use hotspot_map_server_models::ApiHotspotResponse;

#[derive(Parser)]
#[command(name = "hotspot_map", about = "Accident hotspot detection and ranking")]
struct Cli {
    /// Config file (defaults to `hotspot_map.toml` or `HOTSPOT_MAP_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Accident table to load, overriding the config and `ACCIDENTS_CSV`
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the report
    Analyze(AnalyzeArgs),
    /// Explore time windows and clustering parameters in a prompt loop
    Interactive {
        /// Show help text next to every control
        #[arg(long)]
        verbose: bool,
    },
    /// Start the JSON API server
    Serve {
        /// Bind address (defaults to `BIND_ADDR` or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
        /// Port (defaults to `PORT` or 8080)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// `AllDay`, `MorningRush`, `EveningRush` or `NightOwl`
    #[arg(long, value_parser = parse_time_window)]
    time_window: Option<TimeWindow>,

    /// Search radius in meters (20-500)
    #[arg(long)]
    radius_meters: Option<f64>,

    /// Minimum accidents per cluster (5-100)
    #[arg(long)]
    min_samples: Option<usize>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show help text next to the parameters
    #[arg(long)]
    verbose: bool,
}

/// Top-level tool selection when no subcommand is given.
enum Tool {
    Analyze,
    Explore,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Analyze, Self::Explore, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Analyze => "Analyze with default parameters",
            Self::Explore => "Explore hotspots interactively",
            Self::Server => "Start server (prompt for dataset and address)",
        }
    }
}

fn parse_time_window(value: &str) -> Result<TimeWindow, String> {
    value
        .parse()
        .map_err(|_| format!("unknown time window '{value}'"))
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path, true)?.with_dataset_override(
            std::env::var_os(hotspot_map_hotspot::config::DATASET_PATH_ENV).map(PathBuf::from),
        ),
        None => DashboardConfig::load()?,
    };
    Ok(config.with_dataset_override(cli.dataset.clone()))
}

fn analyze(
    dashboard: &Dashboard,
    multi: &MultiProgress,
    args: &AnalyzeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut query = dashboard.default_query();
    if let Some(window) = args.time_window {
        query.time_window = window;
    }
    if let Some(radius) = args.radius_meters {
        query.params.radius_meters = radius;
    }
    if let Some(min_samples) = args.min_samples {
        query.params.min_samples = min_samples;
    }

    let progress = IndicatifProgress::rows_spinner(multi, "Loading accidents");
    let run = dashboard.run(&query, &progress)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ApiHotspotResponse::from(run))?
        );
    } else {
        print!("{}", render::render_run(&run, args.verbose));
    }

    Ok(())
}

fn serve(dashboard: Dashboard, bind: Option<String>, port: Option<u16>) -> std::io::Result<()> {
    let mut bind_config = BindConfig::from_env();
    if let Some(addr) = bind {
        bind_config.addr = addr;
    }
    if let Some(port) = port {
        bind_config.port = port;
    }

    actix_web::rt::System::new().block_on(hotspot_map_server::run_server(dashboard, bind_config))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = hotspot_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    log::debug!("Using dataset {}", config.dataset_path.display());

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Accident Hotspot Map");
            println!();

            let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();
            let idx = Select::new()
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact()?;

            match Tool::ALL[idx] {
                Tool::Analyze => Commands::Analyze(AnalyzeArgs {
                    time_window: None,
                    radius_meters: None,
                    min_samples: None,
                    json: false,
                    verbose: false,
                }),
                Tool::Explore => Commands::Interactive { verbose: false },
                Tool::Server => {
                    tokio::task::spawn_blocking(move || {
                        actix_web::rt::System::new()
                            .block_on(hotspot_map_server::interactive::run(config))
                    })
                    .await??;
                    return Ok(());
                }
            }
        }
    };

    match command {
        Commands::Analyze(args) => analyze(&Dashboard::new(config), &multi, &args)?,
        Commands::Interactive { verbose } => {
            interactive::run(&Dashboard::new(config), &multi, verbose)?;
        }
        Commands::Serve { bind, port } => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            let dashboard = Dashboard::new(config);
            tokio::task::spawn_blocking(move || serve(dashboard, bind, port)).await??;
        }
    }

    Ok(())
}
