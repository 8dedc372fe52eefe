//! Arm simulation state and the controls that mutate it.
//!
//! [`ArmState`] owns everything that changes between ticks: joint angles,
//! link lengths, the target, the tracking state and the movement counter.
//! The caller owns the state and hands it to [`ArmState::tick`] once per
//! frame; target picks and joint-count changes go through
//! [`ArmState::pick_target`] and [`ArmState::set_joint_count`].

use bevy::prelude::Resource;
use nalgebra::Point2;
use reach_core::config::ArmConfig;
use reach_core::error::ValidationError;
use reach_core::types::{JointCount, TrackingState};
use tracing::info;

use crate::chain::PlanarChain;
use crate::solver::{GradientSolver, IkResult};

// ---------------------------------------------------------------------------
// ArmFrame
// ---------------------------------------------------------------------------

/// Plain-data snapshot handed to rendering sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmFrame {
    /// Joint positions, base first, end effector last.
    pub joint_positions: Vec<Point2<f64>>,
    /// Current target, if any.
    pub target: Option<Point2<f64>>,
    /// Arm base.
    pub base: Point2<f64>,
    /// Solver ticks since the last target change.
    pub movement_count: u64,
    /// Whether the current target has been reached.
    pub tracking: TrackingState,
}

impl ArmFrame {
    /// End-effector position.
    pub fn end_effector(&self) -> Point2<f64> {
        self.joint_positions
            .last()
            .copied()
            .unwrap_or_else(Point2::origin)
    }

    /// End-effector-to-target distance, if a target is set.
    pub fn error(&self) -> Option<f64> {
        self.target.map(|t| (t - self.end_effector()).norm())
    }
}

// ---------------------------------------------------------------------------
// ArmState
// ---------------------------------------------------------------------------

/// Complete mutable state of the simulated arm.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ArmState {
    angles: Vec<f64>,
    chain: PlanarChain,
    target: Option<Point2<f64>>,
    tracking: TrackingState,
    movement_count: u64,
}

impl ArmState {
    /// Fresh state for the configured joint count and default target.
    pub fn new(config: &ArmConfig) -> Self {
        let n = config.joints.get();
        let target = default_target(config);
        Self {
            angles: vec![config.initial_angle(); n],
            chain: PlanarChain::adapted(&target, n),
            target: Some(target),
            tracking: TrackingState::Seeking,
            movement_count: 0,
        }
    }

    /// Joint angles in radians, base first. Never wrapped.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Current chain (link lengths).
    pub const fn chain(&self) -> &PlanarChain {
        &self.chain
    }

    /// Current target, if any.
    pub const fn target(&self) -> Option<Point2<f64>> {
        self.target
    }

    /// Per-target tracking state.
    pub const fn tracking(&self) -> TrackingState {
        self.tracking
    }

    /// Whether the current target has been reached.
    pub const fn is_reached(&self) -> bool {
        self.tracking.is_reached()
    }

    /// Solver ticks since the last target or joint-count change.
    pub const fn movement_count(&self) -> u64 {
        self.movement_count
    }

    /// Number of joints.
    pub fn joint_count(&self) -> usize {
        self.angles.len()
    }

    /// Joint-count control.
    ///
    /// Resets the angles to the configured initial angle, the target to the
    /// configured default, the link lengths to match, the tracking state to
    /// `Seeking` and the movement counter to zero. The driver follows up
    /// with one [`tick`](Self::tick) to refresh the pose.
    pub fn set_joint_count(
        &mut self,
        joints: usize,
        config: &ArmConfig,
    ) -> Result<(), ValidationError> {
        let n = JointCount::new(joints)?.get();
        let target = default_target(config);
        self.angles = vec![config.initial_angle(); n];
        self.chain = PlanarChain::adapted(&target, n);
        self.target = Some(target);
        self.tracking = TrackingState::Seeking;
        self.movement_count = 0;
        info!(joints = n, "joint count changed");
        Ok(())
    }

    /// Target-selection control.
    ///
    /// Picks outside `[-extent, extent]` on either axis are rejected, as are
    /// non-finite ones. An accepted pick replaces the target, returns the
    /// tracking state to `Seeking` and zeroes the movement counter; angles
    /// are left alone.
    pub fn pick_target(
        &mut self,
        point: Point2<f64>,
        extent: f64,
    ) -> Result<(), ValidationError> {
        check_finite(&point)?;
        if point.x.abs() > extent || point.y.abs() > extent {
            return Err(ValidationError::TargetOutsideWorkspace {
                x: point.x,
                y: point.y,
                extent,
            });
        }
        self.target = Some(point);
        self.tracking = TrackingState::Seeking;
        self.movement_count = 0;
        info!(x = point.x, y = point.y, "target picked");
        Ok(())
    }

    /// Drop the target. Later ticks leave the angles untouched.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.tracking = TrackingState::Seeking;
        self.movement_count = 0;
    }

    /// Run the solver once unless the target is already reached, then
    /// return the frame to draw.
    pub fn tick(&mut self, solver: &GradientSolver) -> ArmFrame {
        self.step(solver);
        self.frame()
    }

    /// Run the solver once unless the target is already reached.
    ///
    /// Returns the solver result, or `None` if the solver was skipped or
    /// had no target.
    pub fn step(&mut self, solver: &GradientSolver) -> Option<IkResult> {
        if self.tracking.is_reached() {
            return None;
        }
        let result = solver.solve(&mut self.chain, self.target.as_ref(), &mut self.angles);
        if let Some(result) = &result {
            self.tracking = TrackingState::from(result.converged);
        }
        self.movement_count += 1;
        result
    }

    /// Joint positions for the current angles and link lengths.
    pub fn joint_positions(&self) -> Vec<Point2<f64>> {
        self.chain.forward_kinematics(&self.angles)
    }

    /// Snapshot for rendering.
    pub fn frame(&self) -> ArmFrame {
        ArmFrame {
            joint_positions: self.joint_positions(),
            target: self.target,
            base: Point2::origin(),
            movement_count: self.movement_count,
            tracking: self.tracking,
        }
    }
}

impl Default for ArmState {
    fn default() -> Self {
        Self::new(&ArmConfig::default())
    }
}

fn default_target(config: &ArmConfig) -> Point2<f64> {
    let [x, y] = config.default_target;
    Point2::new(x, y)
}

fn check_finite(point: &Point2<f64>) -> Result<(), ValidationError> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteTarget)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
