//! Finite-difference gradient descent IK solver.
//!
//! Each sweep estimates, joint by joint, how the end-effector-to-target
//! distance changes when that joint's angle is nudged, and steps the angle
//! against that slope. No Jacobian is formed.

use nalgebra::Point2;
use reach_core::config::SolverConfig;
use tracing::{debug, trace};

use crate::chain::PlanarChain;

/// Result of an IK solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkResult {
    /// Whether the end effector came within tolerance of the target.
    pub converged: bool,
    /// Gradient sweeps performed before stopping.
    pub iterations: u32,
    /// Final end-effector-to-target distance.
    pub position_error: f64,
}

/// Forward-difference gradient descent solver.
#[derive(Debug, Clone, Default)]
pub struct GradientSolver {
    config: SolverConfig,
}

impl GradientSolver {
    /// Create a new solver with the given configuration.
    pub const fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Active configuration.
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Drive `angles` toward placing the chain's tip on `target`.
    ///
    /// The chain is first rebuilt with one link per angle, each sized from
    /// the target distance. Angles are updated in place, one joint after
    /// another, so each joint's probe sees the joints before it already
    /// moved. Angles are not wrapped.
    ///
    /// Returns `None` and leaves everything untouched when `target` is
    /// `None`. Running out of iterations is not an error: the result reports
    /// `converged: false` and `angles` hold the last iterate.
    pub fn solve(
        &self,
        chain: &mut PlanarChain,
        target: Option<&Point2<f64>>,
        angles: &mut [f64],
    ) -> Option<IkResult> {
        let target = target?;
        chain.adapt_to(target, angles.len());

        let SolverConfig {
            step_size,
            max_iterations,
            tolerance,
            perturbation,
        } = self.config;
        let mut probe = angles.to_vec();

        for iteration in 0..max_iterations {
            let distance = (target - chain.end_effector(angles)).norm();
            if distance < tolerance {
                debug!(iterations = iteration, error = distance, "ik converged");
                return Some(IkResult {
                    converged: true,
                    iterations: iteration,
                    position_error: distance,
                });
            }
            trace!(iteration, error = distance, "ik sweep");

            for joint in 0..angles.len() {
                probe.copy_from_slice(angles);
                probe[joint] += perturbation;
                let perturbed = (target - chain.end_effector(&probe)).norm();
                let slope = (perturbed - distance) / perturbation;
                angles[joint] -= step_size * slope;
            }
        }

        let distance = (target - chain.end_effector(angles)).norm();
        debug!(
            iterations = max_iterations,
            error = distance,
            "ik iteration budget exhausted"
        );
        Some(IkResult {
            converged: false,
            iterations: max_iterations,
            position_error: distance,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use approx::assert_relative_eq;

    use super::*;

    fn run_until_reached(
        solver: &GradientSolver,
        target: Point2<f64>,
        angles: &mut [f64],
        max_calls: usize,
    ) -> Option<usize> {
        let mut chain = PlanarChain::uniform(angles.len(), 2.0);
        for call in 1..=max_calls {
            let result = solver.solve(&mut chain, Some(&target), angles)?;
            if result.converged {
                return Some(call);
            }
        }
        None
    }

    #[test]
    fn absent_target_is_noop() {
        let solver = GradientSolver::with_defaults();
        let mut chain = PlanarChain::uniform(3, 2.0);
        let mut angles = [0.1, 0.2, 0.3];

        let result = solver.solve(&mut chain, None, &mut angles);

        assert!(result.is_none());
        assert_eq!(angles, [0.1, 0.2, 0.3]);
        assert_eq!(chain.link_lengths(), &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn solve_adapts_link_lengths() {
        let solver = GradientSolver::with_defaults();
        let mut chain = PlanarChain::uniform(2, 2.0);
        let mut angles = [FRAC_PI_4, FRAC_PI_4];

        solver.solve(&mut chain, Some(&Point2::new(0.0, 3.0)), &mut angles);

        assert_eq!(chain.link_lengths(), &[1.5, 1.5]);
    }

    #[test]
    fn joint_count_follows_angles_not_chain() {
        let solver = GradientSolver::with_defaults();
        let target = Point2::new(3.0, 1.0);
        let mut chain = PlanarChain::uniform(2, 2.0);
        let mut angles = [0.3; 3];

        let result = solver.solve(&mut chain, Some(&target), &mut angles).unwrap();

        assert_eq!(chain.dof(), 3);
        assert_relative_eq!(
            chain.link_lengths().iter().sum::<f64>(),
            target.coords.norm(),
            epsilon = 1e-12
        );
        // Every joint, including the one the old chain lacked, was walked.
        assert!(angles.iter().all(|&a| (a - 0.3).abs() > 1e-9));
        let error = (target - chain.end_effector(&angles)).norm();
        assert_relative_eq!(result.position_error, error, epsilon = 1e-12);
    }

    #[test]
    fn already_within_tolerance_stops_immediately() {
        let solver = GradientSolver::with_defaults();
        let target = Point2::new(0.0, 3.0);
        let mut chain = PlanarChain::uniform(2, 1.0);
        // Straight up: tip exactly on the target once links are 1.5 each.
        let mut angles = [std::f64::consts::FRAC_PI_2, 0.0];

        let result = solver.solve(&mut chain, Some(&target), &mut angles).unwrap();

        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(angles, [std::f64::consts::FRAC_PI_2, 0.0]);
    }

    #[test]
    fn converges_on_reference_scenario() {
        // Two joints starting at 45 deg each, target (3, 1).
        let solver = GradientSolver::with_defaults();
        let target = Point2::new(3.0, 1.0);
        let mut angles = [FRAC_PI_4, FRAC_PI_4];

        let calls = run_until_reached(&solver, target, &mut angles, 40);
        assert!(calls.is_some(), "did not reach target, angles={angles:?}");

        let chain = PlanarChain::adapted(&target, 2);
        let error = (target - chain.end_effector(&angles)).norm();
        assert!(error < 0.1, "error={error}");
    }

    #[test]
    fn converges_for_three_joints() {
        let solver = GradientSolver::with_defaults();
        let target = Point2::new(3.0, 1.0);
        let mut angles = [FRAC_PI_4; 3];
        assert!(run_until_reached(&solver, target, &mut angles, 40).is_some());
    }

    #[test]
    fn single_call_reduces_error() {
        let solver = GradientSolver::with_defaults();
        let target = Point2::new(-2.0, 2.0);
        let mut angles = [FRAC_PI_4, FRAC_PI_4];
        let before = PlanarChain::adapted(&target, 2).end_effector(&angles);
        let before = (target - before).norm();

        let mut chain = PlanarChain::uniform(2, 2.0);
        let result = solver.solve(&mut chain, Some(&target), &mut angles).unwrap();

        assert!(result.position_error < before);
    }

    #[test]
    fn non_convergence_reports_budget() {
        let solver = GradientSolver::new(SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        });
        let target = Point2::new(3.0, 1.0);
        let mut chain = PlanarChain::uniform(2, 2.0);
        let mut angles = [FRAC_PI_4, FRAC_PI_4];

        let result = solver.solve(&mut chain, Some(&target), &mut angles).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        let error = (target - chain.end_effector(&angles)).norm();
        assert_relative_eq!(result.position_error, error, epsilon = 1e-12);
    }

    #[test]
    fn first_sweep_matches_hand_computation() {
        let config = SolverConfig {
            max_iterations: 1,
            ..SolverConfig::default()
        };
        let solver = GradientSolver::new(config);
        let target = Point2::new(3.0, 1.0);
        let mut chain = PlanarChain::uniform(2, 2.0);
        let mut angles = [FRAC_PI_4, FRAC_PI_4];
        solver.solve(&mut chain, Some(&target), &mut angles);

        // Replay one sweep by hand: sequential joint updates against the
        // distance measured at the start of the sweep.
        let reference = PlanarChain::adapted(&target, 2);
        let mut expected = [FRAC_PI_4, FRAC_PI_4];
        let distance = (target - reference.end_effector(&expected)).norm();
        for joint in 0..2 {
            let mut probe = expected;
            probe[joint] += config.perturbation;
            let perturbed = (target - reference.end_effector(&probe)).norm();
            expected[joint] -= config.step_size * (perturbed - distance) / config.perturbation;
        }

        assert_relative_eq!(angles[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(angles[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn target_at_origin_does_not_fail() {
        let solver = GradientSolver::with_defaults();
        let mut chain = PlanarChain::uniform(3, 2.0);
        let mut angles = [0.3, 0.6, 0.9];

        let result = solver
            .solve(&mut chain, Some(&Point2::origin()), &mut angles)
            .unwrap();

        assert!(result.converged);
        assert_eq!(chain.link_lengths(), &[0.0, 0.0, 0.0]);
        assert!(angles.iter().all(|a| a.is_finite()));
    }
}
