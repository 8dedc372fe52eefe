//! Planar reach simulation CLI.
//!
//! Provides three modes of operation:
//! - `run`: Drive the arm toward a target tick by tick, printing frames
//! - `sweep`: Report ticks-to-reach for every supported joint count
//! - `info`: Print the version and effective configuration

mod sink;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use clap::{Parser, Subcommand};
use nalgebra::Point2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reach_core::prelude::*;
use reach_ik::{ArmCommands, ArmState, GradientSolver, LatestFrame, ReachIkPlugin};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::sink::{FrameSink, TextSink};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Planar multi-link arm driven by finite-difference inverse kinematics.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the arm toward a target and print frames.
    Run(RunArgs),

    /// Ticks needed to reach a target for each joint count.
    Sweep {
        /// Target point.
        #[arg(short, long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        target: Option<Vec<f64>>,

        /// Tick budget per joint count.
        #[arg(long, default_value_t = 200)]
        ticks: u64,
    },

    /// Print version and effective configuration.
    Info,
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Number of joints (overrides the configuration).
    #[arg(short, long)]
    joints: Option<usize>,

    /// Target point (overrides the configured default).
    #[arg(short, long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    target: Option<Vec<f64>>,

    /// Maximum ticks to run.
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Random targets to pick after each one is reached.
    #[arg(long, default_value_t = 0)]
    retarget: u32,

    /// Seed for random retargeting.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Print every Nth frame (reached frames are always printed).
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Print joint positions on each line.
    #[arg(long)]
    show_joints: bool,
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

/// Rendering sink resource fed from [`LatestFrame`].
#[derive(Resource)]
struct FramePrinter {
    sink: TextSink<io::Stdout>,
    every: u64,
    last_tracking: TrackingState,
}

#[allow(clippy::needless_pass_by_value)]
fn print_frame_system(latest: Res<LatestFrame>, mut printer: ResMut<FramePrinter>) {
    let Some(frame) = &latest.0 else {
        return;
    };
    let just_reached = frame.tracking.is_reached() && !printer.last_tracking.is_reached();
    printer.last_tracking = frame.tracking;

    if just_reached || (!frame.tracking.is_reached() && frame.movement_count % printer.every == 0)
    {
        if let Err(e) = printer.sink.present(frame) {
            error!("failed to print frame: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn parse_point(values: Option<&[f64]>) -> Option<Point2<f64>> {
    match values {
        Some([x, y]) => Some(Point2::new(*x, *y)),
        _ => None,
    }
}

fn run(mut config: ReachConfig, args: &RunArgs) -> Result<(), ReachError> {
    if let Some(joints) = args.joints {
        config.arm.joints = JointCount::new(joints)?;
    }
    let extent = config.arm.workspace_half_extent;

    let mut app = App::new();
    app.add_plugins(ReachCorePlugin::new(config))
        .add_plugins(ReachIkPlugin)
        .insert_resource(FramePrinter {
            sink: TextSink::new(io::stdout(), args.show_joints),
            every: args.every.max(1),
            last_tracking: TrackingState::Seeking,
        })
        .add_systems(Update, print_frame_system.in_set(ReachSet::Render));
    app.finish();
    app.cleanup();

    if let Some(target) = parse_point(args.target.as_deref()) {
        app.world_mut()
            .resource_mut::<ArmState>()
            .pick_target(target, extent)?;
    }

    info!(
        joints = config.arm.joints.get(),
        ticks = args.ticks,
        "starting run"
    );

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut retargets_left = args.retarget;
    let mut targets_reached = 0u32;

    for _ in 0..args.ticks {
        app.update();

        if !app.world().resource::<ArmState>().is_reached() {
            continue;
        }
        targets_reached += 1;
        if retargets_left == 0 {
            break;
        }
        retargets_left -= 1;
        let x = rng.gen_range(-extent..=extent);
        let y = rng.gen_range(-extent..=extent);
        app.world_mut()
            .resource_mut::<ArmCommands>()
            .pick_target(x, y);
    }

    let state = app.world().resource::<ArmState>();
    info!(
        targets_reached,
        reached = state.is_reached(),
        moves = state.movement_count(),
        "run finished"
    );
    Ok(())
}

fn run_sweep(
    config: &ReachConfig,
    target: Option<Point2<f64>>,
    ticks: u64,
) -> Result<(), ReachError> {
    let solver = GradientSolver::new(config.solver);
    let extent = config.arm.workspace_half_extent;

    println!("joints  ticks  error");
    for count in JointCount::all() {
        let mut state = ArmState::new(&config.arm);
        state.set_joint_count(count.get(), &config.arm)?;
        if let Some(target) = target {
            state.pick_target(target, extent)?;
        }

        let mut reached_at = None;
        for tick in 1..=ticks {
            state.tick(&solver);
            if state.is_reached() {
                reached_at = Some(tick);
                break;
            }
        }

        let error = state.frame().error().unwrap_or(f64::NAN);
        match reached_at {
            Some(tick) => println!("{count:>6}  {tick:>5}  {error:.4}"),
            None => println!("{count:>6}  {:>5}  {error:.4}", "-"),
        }
    }
    Ok(())
}

fn run_info(config: &ReachConfig) {
    println!("reach v{}", env!("CARGO_PKG_VERSION"));
    println!();
    match toml::to_string_pretty(config) {
        Ok(text) => print!("{text}"),
        Err(e) => error!("failed to serialize configuration: {e}"),
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), ReachError> {
    let config = match &cli.config {
        Some(path) => ReachConfig::from_file(path)?,
        None => ReachConfig::default(),
    };

    match cli.command {
        Some(Commands::Run(args)) => run(config, &args),
        Some(Commands::Sweep { target, ticks }) => {
            run_sweep(&config, parse_point(target.as_deref()), ticks)
        }
        Some(Commands::Info) => {
            run_info(&config);
            Ok(())
        }
        None => run(config, &RunArgs {
            ticks: 200,
            every: 1,
            ..RunArgs::default()
        }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_negative_target() {
        let cli =
            Cli::try_parse_from(["reach", "run", "--target", "-2", "1.5", "--joints", "3"])
                .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.joints, Some(3));
        assert_eq!(
            parse_point(args.target.as_deref()),
            Some(Point2::new(-2.0, 1.5))
        );
    }

    #[test]
    fn run_rejects_bad_joint_count() {
        let args = RunArgs {
            joints: Some(9),
            ticks: 1,
            every: 1,
            ..RunArgs::default()
        };
        let err = run(ReachConfig::default(), &args).unwrap_err();
        assert!(matches!(err, ReachError::Validation(_)));
    }

    #[test]
    fn run_rejects_target_outside_workspace() {
        let args = RunArgs {
            target: Some(vec![7.0, 0.0]),
            ticks: 1,
            every: 1,
            ..RunArgs::default()
        };
        assert!(run(ReachConfig::default(), &args).is_err());
    }

    #[test]
    fn sweep_runs_for_all_joint_counts() {
        run_sweep(&ReachConfig::default(), Some(Point2::new(-2.0, 2.0)), 5).unwrap();
    }
}
