//! Coarse topology classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One-word summary of a mesh's topology.
///
/// Serializes as `good`, `has_holes`, `non_manifold` or `complex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyStatus {
    /// Closed, consistently wound, Euler characteristic 2.
    Good,
    /// At least one edge is used by a single face.
    HasHoles,
    /// Closed but with inconsistent winding or edges shared by 3+ faces.
    NonManifold,
    /// Closed and consistent, but not a topological sphere.
    Complex,
}

impl TopologyStatus {
    /// Classify from the three topology signals.
    ///
    /// Checks are applied in order; the first that fails decides.
    ///
    /// ```
    /// use chisel::algo::topology::TopologyStatus;
    ///
    /// assert_eq!(TopologyStatus::classify(true, true, 2), TopologyStatus::Good);
    /// assert_eq!(TopologyStatus::classify(false, false, 2), TopologyStatus::HasHoles);
    /// assert_eq!(TopologyStatus::classify(true, true, 0), TopologyStatus::Complex);
    /// ```
    pub fn classify(watertight: bool, winding_consistent: bool, euler: i64) -> Self {
        if !watertight {
            Self::HasHoles
        } else if !winding_consistent {
            Self::NonManifold
        } else if euler == 2 {
            Self::Good
        } else {
            Self::Complex
        }
    }

    /// Snake-case name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::HasHoles => "has_holes",
            Self::NonManifold => "non_manifold",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for TopologyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
