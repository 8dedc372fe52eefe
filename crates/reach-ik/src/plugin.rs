//! Bevy ECS integration for the reach solver.
//!
//! Provides [`ReachIkPlugin`] which owns the [`ArmState`] resource and
//! advances it once per `Update`.
//!
//! # Usage
//!
//! 1. Add [`ReachCorePlugin`](reach_core::ReachCorePlugin), then
//!    [`ReachIkPlugin`].
//! 2. Queue target picks and joint-count changes on [`ArmCommands`].
//! 3. Read the [`LatestFrame`] resource from a system in
//!    [`ReachSet::Render`] to draw the arm.
//!
//! Commands are applied in [`ReachSet::Input`] and the solver tick runs in
//! [`ReachSet::Solve`], so a joint-count change is always followed by one
//! tick in the same frame.

use bevy::prelude::*;
use nalgebra::Point2;
use reach_core::ReachSet;
use reach_core::config::ReachConfig;
use tracing::warn;

use crate::solver::GradientSolver;
use crate::state::{ArmFrame, ArmState};

/// Bevy plugin that adds the arm state and per-frame solver tick.
///
/// Reads [`ReachConfig`] if present when built, defaults otherwise.
pub struct ReachIkPlugin;

impl Plugin for ReachIkPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<ReachConfig>()
            .copied()
            .unwrap_or_default();

        app.insert_resource(ArmState::new(&config.arm))
            .insert_resource(IkSolver(GradientSolver::new(config.solver)))
            .init_resource::<ArmCommands>()
            .init_resource::<LatestFrame>()
            .add_systems(
                Update,
                (
                    apply_arm_commands_system.in_set(ReachSet::Input),
                    arm_tick_system.in_set(ReachSet::Solve),
                ),
            );
    }
}

/// Resource wrapping the solver used by [`arm_tick_system`].
#[derive(Resource, Debug, Clone, Default)]
pub struct IkSolver(pub GradientSolver);

/// Pending control input, drained once per frame.
///
/// External controls (pointer picks, a joint-count slider) write here; the
/// plugin applies the requests before the solver tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct ArmCommands {
    joint_count: Option<usize>,
    target: Option<Point2<f64>>,
}

impl ArmCommands {
    /// Request a joint-count change. The latest request wins.
    pub fn set_joint_count(&mut self, joints: usize) {
        self.joint_count = Some(joints);
    }

    /// Request a new target. The latest request wins.
    pub fn pick_target(&mut self, x: f64, y: f64) {
        self.target = Some(Point2::new(x, y));
    }

    /// Whether any request is waiting.
    pub const fn is_pending(&self) -> bool {
        self.joint_count.is_some() || self.target.is_some()
    }
}

/// Frame produced by the most recent tick, for rendering sinks.
#[derive(Resource, Debug, Clone, Default)]
pub struct LatestFrame(pub Option<ArmFrame>);

/// System that applies queued control input to [`ArmState`].
///
/// A joint-count change is applied before a target pick queued in the same
/// frame, since the former restores the default target. Rejected requests
/// are logged and dropped.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_arm_commands_system(
    mut commands: ResMut<ArmCommands>,
    mut state: ResMut<ArmState>,
    config: Option<Res<ReachConfig>>,
) {
    if !commands.is_pending() {
        return;
    }
    let config = config.map(|c| *c).unwrap_or_default();

    if let Some(joints) = commands.joint_count.take() {
        if let Err(e) = state.set_joint_count(joints, &config.arm) {
            warn!("joint count change rejected: {e}");
        }
    }
    if let Some(point) = commands.target.take() {
        if let Err(e) = state.pick_target(point, config.arm.workspace_half_extent) {
            warn!("target pick rejected: {e}");
        }
    }
}

/// System that runs one solver tick and publishes the resulting frame.
#[allow(clippy::needless_pass_by_value)]
pub fn arm_tick_system(
    mut state: ResMut<ArmState>,
    solver: Res<IkSolver>,
    mut latest: ResMut<LatestFrame>,
) {
    latest.0 = Some(state.tick(&solver.0));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
