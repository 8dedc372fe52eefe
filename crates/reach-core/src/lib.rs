//! Shared types, configuration, errors and system ordering for the planar
//! reach simulation.
//!
//! [`ReachCorePlugin`] inserts the [`ReachConfig`](config::ReachConfig)
//! resource and orders the [`ReachSet`] phases every `Update`:
//!
//! ```text
//! Input ──► Solve ──► Render
//! ```

pub mod config;
pub mod error;
pub mod types;

use bevy::prelude::*;

use crate::config::ReachConfig;

// ---------------------------------------------------------------------------
// ReachSet
// ---------------------------------------------------------------------------

/// Per-tick system phases, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReachSet {
    /// Apply target picks and joint-count changes.
    Input,
    /// Run the inverse-kinematics tick.
    Solve,
    /// Hand the resulting frame to rendering sinks.
    Render,
}

// ---------------------------------------------------------------------------
// ReachCorePlugin
// ---------------------------------------------------------------------------

/// Core plugin: configuration resource and system ordering.
#[derive(Default)]
pub struct ReachCorePlugin {
    /// Configuration to insert. Validated by the caller.
    pub config: ReachConfig,
}

impl ReachCorePlugin {
    /// Plugin with an explicit configuration.
    #[must_use]
    pub const fn new(config: ReachConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ReachCorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config).configure_sets(
            Update,
            (ReachSet::Input, ReachSet::Solve, ReachSet::Render).chain(),
        );
    }
}

pub mod prelude {
    pub use crate::config::{ArmConfig, ReachConfig, SolverConfig};
    pub use crate::error::{ConfigError, ReachError, ValidationError};
    pub use crate::types::{JointCount, MAX_JOINTS, MIN_JOINTS, TrackingState};
    pub use crate::{ReachCorePlugin, ReachSet};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
