//! Planar serial chain: link lengths and forward kinematics.
//!
//! Every joint is revolute about the plane normal, so a joint's world
//! orientation is the running sum of the angles up to and including it.

use nalgebra::{Point2, Vector2};

/// An ordered planar chain of links rooted at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarChain {
    link_lengths: Vec<f64>,
}

impl PlanarChain {
    /// Chain of `n` links, each `length` long.
    pub fn uniform(n: usize, length: f64) -> Self {
        Self {
            link_lengths: vec![length; n],
        }
    }

    /// Chain of `n` equal links whose total length equals the distance from
    /// the base to `target`.
    ///
    /// Fully stretched toward the target, the tip lands exactly on it. A
    /// target at the origin gives zero-length links.
    pub fn adapted(target: &Point2<f64>, n: usize) -> Self {
        Self {
            link_lengths: adapted_link_lengths(target, n),
        }
    }

    /// Recompute the link lengths in place for a new target and `n` joints.
    ///
    /// The chain is resized to `n` links whatever its previous length.
    pub fn adapt_to(&mut self, target: &Point2<f64>, n: usize) {
        self.link_lengths = adapted_link_lengths(target, n);
    }

    /// Number of joints (one link per joint).
    pub fn dof(&self) -> usize {
        self.link_lengths.len()
    }

    /// Link lengths, base to tip.
    pub fn link_lengths(&self) -> &[f64] {
        &self.link_lengths
    }

    /// Total length of the fully stretched chain.
    pub fn reach(&self) -> f64 {
        self.link_lengths.iter().sum()
    }

    /// Joint positions for the given angles, base first, tip last.
    ///
    /// Returns `dof() + 1` points starting at the origin. Angles beyond the
    /// link count are ignored, and links beyond the angle count are not
    /// walked.
    pub fn forward_kinematics(&self, angles: &[f64]) -> Vec<Point2<f64>> {
        let mut positions = Vec::with_capacity(self.dof() + 1);
        let mut position = Point2::origin();
        let mut heading = 0.0_f64;
        positions.push(position);

        for (&length, &angle) in self.link_lengths.iter().zip(angles) {
            heading += angle;
            let (sin, cos) = heading.sin_cos();
            position += Vector2::new(cos, sin) * length;
            positions.push(position);
        }
        positions
    }

    /// Tip position for the given angles.
    pub fn end_effector(&self, angles: &[f64]) -> Point2<f64> {
        let mut position = Point2::origin();
        let mut heading = 0.0_f64;
        for (&length, &angle) in self.link_lengths.iter().zip(angles) {
            heading += angle;
            let (sin, cos) = heading.sin_cos();
            position += Vector2::new(cos, sin) * length;
        }
        position
    }
}

/// `n` equal link lengths summing to the base-to-target distance.
#[allow(clippy::cast_precision_loss)]
pub fn adapted_link_lengths(target: &Point2<f64>, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let length = target.coords.norm() / n as f64;
    vec![length; n]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
