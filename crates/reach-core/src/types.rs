use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fewest joints the arm can be configured with.
pub const MIN_JOINTS: usize = 2;

/// Most joints the arm can be configured with.
pub const MAX_JOINTS: usize = 5;

// ---------------------------------------------------------------------------
// JointCount
// ---------------------------------------------------------------------------

/// Number of revolute joints in the arm, always within
/// [`MIN_JOINTS`]`..=`[`MAX_JOINTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct JointCount(usize);

impl JointCount {
    /// Validate and wrap a joint count.
    pub const fn new(n: usize) -> Result<Self, ValidationError> {
        if n < MIN_JOINTS || n > MAX_JOINTS {
            return Err(ValidationError::JointCountOutOfRange {
                got: n,
                min: MIN_JOINTS,
                max: MAX_JOINTS,
            });
        }
        Ok(Self(n))
    }

    /// The wrapped count.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Every supported joint count, in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (MIN_JOINTS..=MAX_JOINTS).map(Self)
    }
}

impl Default for JointCount {
    fn default() -> Self {
        Self(MIN_JOINTS)
    }
}

impl TryFrom<usize> for JointCount {
    type Error = ValidationError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<JointCount> for usize {
    fn from(count: JointCount) -> Self {
        count.0
    }
}

impl fmt::Display for JointCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// TrackingState
// ---------------------------------------------------------------------------

/// Per-target tracking state.
///
/// `Seeking -> Reached` when the end effector comes within tolerance;
/// `Reached -> Seeking` when the target or the joint count changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackingState {
    /// Still driving toward the current target.
    #[default]
    Seeking,
    /// Within tolerance of the current target; ticks leave the arm alone.
    Reached,
}

impl TrackingState {
    /// Whether the current target has been reached.
    #[must_use]
    pub const fn is_reached(self) -> bool {
        matches!(self, Self::Reached)
    }
}

impl From<bool> for TrackingState {
    fn from(reached: bool) -> Self {
        if reached { Self::Reached } else { Self::Seeking }
    }
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seeking => f.pad("seeking"),
            Self::Reached => f.pad("reached"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_count_accepts_supported_range() {
        for n in MIN_JOINTS..=MAX_JOINTS {
            assert_eq!(JointCount::new(n).unwrap().get(), n);
        }
    }

    #[test]
    fn joint_count_rejects_out_of_range() {
        assert_eq!(
            JointCount::new(1),
            Err(ValidationError::JointCountOutOfRange {
                got: 1,
                min: 2,
                max: 5
            })
        );
        assert!(JointCount::new(0).is_err());
        assert!(JointCount::new(6).is_err());
    }

    #[test]
    fn joint_count_all_is_ascending() {
        let all: Vec<usize> = JointCount::all().map(JointCount::get).collect();
        assert_eq!(all, vec![2, 3, 4, 5]);
    }

    #[test]
    fn joint_count_deserializes_with_validation() {
        #[derive(Deserialize)]
        struct Wrapper {
            joints: JointCount,
        }

        let ok: Wrapper = toml::from_str("joints = 4").unwrap();
        assert_eq!(ok.joints.get(), 4);

        let bad: Result<Wrapper, _> = toml::from_str("joints = 9");
        assert!(bad.is_err());
    }

    #[test]
    fn tracking_state_defaults_to_seeking() {
        assert_eq!(TrackingState::default(), TrackingState::Seeking);
        assert!(!TrackingState::Seeking.is_reached());
        assert!(TrackingState::Reached.is_reached());
    }

    #[test]
    fn tracking_state_from_bool() {
        assert_eq!(TrackingState::from(true), TrackingState::Reached);
        assert_eq!(TrackingState::from(false), TrackingState::Seeking);
        assert_eq!(TrackingState::Reached.to_string(), "reached");
    }
}
