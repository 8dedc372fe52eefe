use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::JointCount;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_step_size() -> f64 {
    0.1
}
const fn default_max_iterations() -> u32 {
    100
}
const fn default_tolerance() -> f64 {
    0.1
}
const fn default_perturbation() -> f64 {
    0.01
}
const fn default_initial_angle_deg() -> f64 {
    45.0
}
const fn default_target() -> [f64; 2] {
    [3.0, 1.0]
}
const fn default_workspace_half_extent() -> f64 {
    5.0
}

fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} (must be finite and > 0)"),
        ))
    }
}

// ---------------------------------------------------------------------------
// SolverConfig
// ---------------------------------------------------------------------------

/// Finite-difference gradient descent parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Gradient descent step size (alpha). Default 0.1.
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    /// Gradient sweeps per solver call. Default 100.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// End-effector distance below which the target counts as reached.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Angle delta (rad) for the forward-difference derivative.
    #[serde(default = "default_perturbation")]
    pub perturbation: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            step_size: default_step_size(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            perturbation: default_perturbation(),
        }
    }
}

impl SolverConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("solver.step_size", self.step_size)?;
        check_positive("solver.tolerance", self.tolerance)?;
        check_positive("solver.perturbation", self.perturbation)?;
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid("solver.max_iterations", "must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ArmConfig
// ---------------------------------------------------------------------------

/// Arm start-up and reset parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Joint count at start-up.
    #[serde(default)]
    pub joints: JointCount,

    /// Angle every joint is reset to, in degrees.
    #[serde(default = "default_initial_angle_deg")]
    pub initial_angle_deg: f64,

    /// Target restored at start-up and on every joint-count change.
    #[serde(default = "default_target")]
    pub default_target: [f64; 2],

    /// Target picks must satisfy `|x| <= extent` and `|y| <= extent`.
    #[serde(default = "default_workspace_half_extent")]
    pub workspace_half_extent: f64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            joints: JointCount::default(),
            initial_angle_deg: default_initial_angle_deg(),
            default_target: default_target(),
            workspace_half_extent: default_workspace_half_extent(),
        }
    }
}

impl ArmConfig {
    /// Initial joint angle in radians.
    pub fn initial_angle(&self) -> f64 {
        self.initial_angle_deg.to_radians()
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_angle_deg.is_finite() {
            return Err(ConfigError::invalid("arm.initial_angle_deg", "must be finite"));
        }
        check_positive("arm.workspace_half_extent", self.workspace_half_extent)?;
        let [x, y] = self.default_target;
        if !(x.is_finite() && y.is_finite()) {
            return Err(ConfigError::invalid("arm.default_target", "must be finite"));
        }
        if x.abs() > self.workspace_half_extent || y.abs() > self.workspace_half_extent {
            return Err(ConfigError::invalid(
                "arm.default_target",
                format!("({x}, {y}) lies outside the workspace"),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReachConfig
// ---------------------------------------------------------------------------

/// Top-level configuration, loadable from TOML.
///
/// ```toml
/// [arm]
/// joints = 3
/// default_target = [2.0, -1.5]
///
/// [solver]
/// step_size = 0.05
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Resource)]
pub struct ReachConfig {
    #[serde(default)]
    pub arm: ArmConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl ReachConfig {
    /// Validate both sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arm.validate()?;
        self.solver.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
