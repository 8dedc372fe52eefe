//! Inverse kinematics for a planar multi-link arm.
//!
//! Provides forward kinematics, link-length adaptation and a
//! finite-difference gradient descent solver that walks the end effector
//! toward a target one tick at a time.
//!
//! # Architecture
//!
//! ```text
//! target ──► PlanarChain::adapt_to ──► GradientSolver ──► joint angles
//!                                            │
//!                         ArmState::tick ◄───┘──► ArmFrame ──► renderer
//! ```
//!
//! Link lengths are re-derived from the target distance on every solve so
//! the fully stretched arm always spans exactly to the target. The
//! [`ArmState`] resource carries everything that persists between ticks.

pub mod chain;
pub mod plugin;
pub mod solver;
pub mod state;

pub use chain::{PlanarChain, adapted_link_lengths};
pub use plugin::{ArmCommands, IkSolver, LatestFrame, ReachIkPlugin};
pub use solver::{GradientSolver, IkResult};
pub use state::{ArmFrame, ArmState};
