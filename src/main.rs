mod config;
mod tracker;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::config::{Config, SimulationConfig};
use crate::tracker::{HttpLocationSource, RefreshOutcome, Tracker};
use crate::web::AppState;

#[derive(Parser)]
#[command(name = "vehicle-tracker")]
#[command(about = "Live vehicle position tracking with simulated fallback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the tracker and the web server
    Serve {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Validate a config file
    Validate {
        #[arg(short, long)]
        config: String,
    },
    /// Fetch the location source once and report the result
    Probe {
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::Validate { config } => validate(&config),
        Commands::Probe { config } => probe(config.as_deref()).await,
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    let result = match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    };
    match result {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Config error: {}", e);
            None
        }
    }
}

fn build_tracker(config: &Config) -> Option<Tracker<HttpLocationSource>> {
    let settings = config.tracker_settings();
    let simulation = config.simulated_route();
    let source = HttpLocationSource::new(config.tracker.source_url.clone());

    match (settings, simulation, source) {
        (Ok(settings), Ok(simulation), Ok(source)) => {
            Some(Tracker::new(source, simulation, settings))
        }
        (Err(e), _, _) | (_, Err(e), _) => {
            eprintln!("Config error: {}", e);
            None
        }
        (_, _, Err(e)) => {
            eprintln!("Error creating location source: {}", e);
            None
        }
    }
}

async fn serve(path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(mut tracker) = build_tracker(&config) else {
        return ExitCode::FAILURE;
    };

    log::info!("Tracking vehicle from {}", config.tracker.source_url);
    if let Err(e) = tracker.start() {
        log::error!("Failed to start tracker: {}", e);
        return ExitCode::FAILURE;
    }

    let state = AppState {
        tracker: tracker.handle(),
        refresh_interval: config.tracker.poll_interval,
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
        log::info!("Shutting down");
    };

    let result = web::run_server(&config.web.bind, state, shutdown).await;
    tracker.stop().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load_config(Some(path)) else {
        return ExitCode::FAILURE;
    };

    let simulation = match &config.tracker.simulation {
        SimulationConfig::Default => "default path".to_string(),
        SimulationConfig::Circle {
            count, radius_km, ..
        } => format!("circle, {} points, {} km", count, radius_km),
        SimulationConfig::Fixed { samples } => format!("fixed, {} points", samples.len()),
    };

    println!("Config is valid");
    println!("  source:           {}", config.tracker.source_url);
    println!("  default position: {}", config.tracker.default_position);
    println!(
        "  poll interval:    {}",
        humantime::format_duration(config.tracker.poll_interval)
    );
    println!(
        "  request timeout:  {}",
        humantime::format_duration(config.tracker.request_timeout)
    );
    println!("  simulation:       {}", simulation);
    println!("  web bind:         {}", config.web.bind);
    ExitCode::SUCCESS
}

async fn probe(path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    let Some(tracker) = build_tracker(&config) else {
        return ExitCode::FAILURE;
    };

    let handle = tracker.handle();
    let outcome = handle.refresh_from_source().await;
    let view = handle.view();

    println!("Source: {}", config.tracker.source_url);
    println!("Mode: {}", view.mode);
    println!(
        "Position: {:.6}, {:.6}",
        view.current_position.lat(),
        view.current_position.lng()
    );
    println!("Route points: {}", view.route_coordinates.len());
    if let Some(updated) = view.last_updated {
        println!("Last update: {}", updated.to_rfc3339());
    }

    match outcome {
        RefreshOutcome::Live => ExitCode::SUCCESS,
        _ => {
            if let Some(error) = view.last_error {
                eprintln!("{}", error);
            }
            ExitCode::FAILURE
        }
    }
}
