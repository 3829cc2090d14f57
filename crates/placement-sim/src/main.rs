//! Placement Sim - Scripted replay of an AR placement session
//!
//! Drives the placement controller with a simulated engine and a scenario
//! file, then reports the final state, surfaces and placed objects.

mod config;
mod engine;
mod replay;
mod report;
mod scenario;

use anyhow::Result;
use clap::Parser;
use placement_core::PlacementController;
use placement_runtime::Dispatcher;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::engine::{SimEngine, SimWorld};
use crate::report::SessionReport;
use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "placement-sim")]
#[command(about = "Replay AR surface placement scenarios against a simulated engine")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "placement.toml")]
    config: PathBuf,

    /// Scenario file to replay
    #[arg(short, long)]
    scenario: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("placement-sim v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?;
    let scenario = Scenario::from_file(&args.scenario)?;
    if scenario.is_empty() {
        warn!(path = %args.scenario.display(), "Scenario has no steps");
    }
    let viewport = config.viewport.to_viewport();

    info!(
        width = viewport.width,
        height = viewport.height,
        grid = config.placement.coverage.grid_divisions,
        "Configuration loaded"
    );

    let world = SimWorld::shared();
    let engine = SimEngine::new(world.clone(), config.engine.world_tracking_supported);
    let mut controller = PlacementController::new(engine, config.placement.clone());
    if !controller.start() {
        warn!("World tracking unsupported; events will only update bookkeeping");
    }

    let (handle, task) = Dispatcher::spawn(controller, config.replay.queue_capacity);
    let collector = tokio::spawn(replay::collect(handle.subscribe()));

    let replayed = replay::run(&scenario, &handle, &world, viewport, &config.replay).await;

    // Dropping the last handle stops the dispatcher
    drop(handle);
    let controller = task.await?;
    let notifications = collector.await?;
    replayed?;

    let report = SessionReport::new(scenario.name.clone(), &controller, &notifications);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }

    Ok(())
}
