//! Trace generation and replay tool.
//!
//! `generate` simulates a true agent on a grid map and writes the
//! resulting trace file; `replay` runs the localization engine over a
//! trace and reports the belief summary and the MAP trajectory error.

use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;

use marga_nav::config::MargaConfig;
use marga_nav::core::WorldPoint;
use marga_nav::grid::GridModel;
use marga_nav::localization::LocalizationEngine;
use marga_nav::pathfinding::AStarPlanner;
use marga_nav::trace::{average_error, run_file_name, Trace, TraceGenerator};

#[derive(Parser)]
#[command(name = "marga_replay", about = "Generate and replay localization traces")]
struct Cli {
    /// Optional YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a trace against a grid map
    Generate {
        /// ASCII grid map file (h . t #)
        #[arg(long)]
        map: PathBuf,

        /// Number of ticks to record
        #[arg(long)]
        rounds: Option<usize>,

        /// RNG seed for reproducible runs
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Run identifier used for the output file name
        #[arg(long, default_value_t = 1)]
        run_id: u32,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Replay a trace through the localization engine
    Replay {
        /// ASCII grid map file (h . t #)
        #[arg(long)]
        map: PathBuf,

        /// Trace file to replay
        #[arg(long)]
        trace: PathBuf,

        /// Number of ticks the trace holds
        #[arg(long)]
        rounds: Option<usize>,
    },

    /// Plan a route between two cells of a grid map
    Route {
        /// ASCII grid map file (h . t #)
        #[arg(long)]
        map: PathBuf,

        /// Origin cell as "row,col"
        #[arg(long)]
        from: String,

        /// Goal cell as "row,col"
        #[arg(long)]
        to: String,
    },
}

fn parse_cell(text: &str) -> Result<marga_nav::CellCoord, String> {
    let mut parts = text.split(',');
    let row = parts
        .next()
        .and_then(|p| p.trim().parse::<i32>().ok())
        .ok_or_else(|| format!("expected row,col, got {text:?}"))?;
    let col = parts
        .next()
        .and_then(|p| p.trim().parse::<i32>().ok())
        .ok_or_else(|| format!("expected row,col, got {text:?}"))?;
    Ok(marga_nav::CellCoord::new(row, col))
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            MargaConfig::load(path)?
        }
        None => MargaConfig::default(),
    };

    match cli.command {
        Command::Generate {
            map,
            rounds,
            seed,
            run_id,
            out_dir,
        } => {
            let grid = load_grid(&map, &config)?;
            let rounds = rounds.unwrap_or(config.localization.rounds);
            let generator = TraceGenerator::new(
                config.localization.success_rate,
                config.localization.sensor_success,
            );
            let mut rng = StdRng::seed_from_u64(seed);
            let (trace, truth) = generator.generate(&grid, rounds, &mut rng)?;

            let out_path = out_dir.join(run_file_name(run_id));
            trace.save(&out_path)?;
            println!(
                "wrote {} ({} ticks, start {}, final true cell {})",
                out_path.display(),
                trace.len(),
                trace.start(),
                truth.cells.last().copied().unwrap_or(trace.start()),
            );
        }

        Command::Replay { map, trace, rounds } => {
            let grid = load_grid(&map, &config)?;
            let rounds = rounds.unwrap_or(config.localization.rounds);
            let trace = Trace::load(&trace, rounds)?;

            let mut engine = LocalizationEngine::new(config.localization.clone())?;
            engine.setup(&grid);
            let summary = engine.run_trace(&grid, &trace)?;

            let mut belief = engine.belief(&grid);
            belief.sort_by(|a, b| b.1.total_cmp(&a.1));

            println!("replayed {} ticks from {}", summary.ticks, trace.start());
            println!("degenerate ticks: {}", summary.degenerate_ticks);
            println!("top belief cells:");
            for (coord, p) in belief.iter().take(5) {
                println!("  {coord}  {p:.4}");
            }
            if let Some(map_cell) = summary.map_path.last() {
                println!("MAP trajectory ends at {map_cell}");
            }

            // The trace does not record the noisy true walk, so score the
            // MAP path against the walk the commands describe when every
            // feasible move succeeds (exact for success_rate ~ 1 runs).
            let replay_walk = walk_under_commands(&grid, &trace);
            let error = average_error(&replay_walk, &summary.map_path);
            println!("average MAP error vs command walk: {error:.3} cells");
        }

        Command::Route { map, from, to } => {
            let grid = load_grid(&map, &config)?;
            let origin = parse_cell(&from)?;
            let goal = parse_cell(&to)?;

            let planner = AStarPlanner::new(
                &grid,
                config.pathfinding.to_astar(grid.cell_size()),
            );
            let result = planner.find_path(origin, grid.cell_center(goal));

            match result.failure {
                None => {
                    println!(
                        "path of {} cells, cost {:.3}, {} nodes expanded",
                        result.length_cells(),
                        result.cost,
                        result.nodes_expanded
                    );
                    for cell in &result.path {
                        println!("  {cell}");
                    }
                }
                Some(failure) => {
                    println!(
                        "no path: {failure:?} ({} nodes expanded)",
                        result.nodes_expanded
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_grid(path: &PathBuf, config: &MargaConfig) -> Result<GridModel, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let grid = GridModel::from_ascii(&text, config.grid.cell_size, WorldPoint::ZERO)?;
    info!(
        "loaded {}x{} grid ({} walkable cells)",
        grid.rows(),
        grid.cols(),
        grid.walkable_count()
    );
    Ok(grid)
}

/// Deterministic walk the trace's commands describe when every move that
/// can succeed does: the ground truth for success_rate = 1 replays.
fn walk_under_commands(grid: &GridModel, trace: &Trace) -> Vec<marga_nav::CellCoord> {
    let mut agent = trace.start();
    trace
        .steps()
        .iter()
        .map(|step| {
            let target = agent + step.command.offset();
            if grid.is_walkable(target) {
                agent = target;
            }
            agent
        })
        .collect()
}
