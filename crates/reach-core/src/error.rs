use thiserror::Error;

/// Top-level error type for reach-core.
#[derive(Debug, Error)]
pub enum ReachError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Input validation errors raised by the arm controls.
///
/// Copy + static messages so controls can return them cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("Joint count out of range: {got} not in [{min}, {max}]")]
    JointCountOutOfRange { got: usize, min: usize, max: usize },

    #[error("Target contains NaN or Inf")]
    NonFiniteTarget,

    #[error("Target ({x}, {y}) outside workspace of half-extent {extent}")]
    TargetOutsideWorkspace { x: f64, y: f64, extent: f64 },
}
