//! Axis-aligned bounds and the canonical axis order.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// A coordinate axis.
///
/// The canonical order is x, y, z; every tie between axes resolves to the
/// earlier one in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Lowercase axis name.
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{}' (expected x, y or z)", other)),
        }
    }
}

/// An axis-aligned bounding box.
///
/// Always derived from the current vertex positions; never cache one across
/// a mutation of the mesh it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Per-axis minimum.
    pub min: Point3<f64>,
    /// Per-axis maximum.
    pub max: Point3<f64>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }
}

impl BoundingBox {
    /// Compute the bounds of a set of points. Returns `None` for an empty set.
    pub fn from_points<'a, It>(points: It) -> Option<Self>
    where
        It: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };

        for p in iter {
            for i in 0..3 {
                bounds.min[i] = bounds.min[i].min(p[i]);
                bounds.max[i] = bounds.max[i].max(p[i]);
            }
        }

        Some(bounds)
    }

    /// Per-axis extent, `max - min`.
    #[inline]
    pub fn dimensions(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Extent along one axis.
    #[inline]
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    /// Center of the box.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal.
    pub fn diagonal(&self) -> f64 {
        self.dimensions().norm()
    }

    /// Axis with the largest extent (first in x, y, z order on ties).
    pub fn widest_axis(&self) -> Axis {
        Axis::ALL
            .into_iter()
            .fold(Axis::X, |best, axis| {
                if self.extent(axis) > self.extent(best) {
                    axis
                } else {
                    best
                }
            })
    }

    /// Axis with the smallest extent (first in x, y, z order on ties).
    pub fn narrowest_axis(&self) -> Axis {
        Axis::ALL
            .into_iter()
            .fold(Axis::X, |best, axis| {
                if self.extent(axis) < self.extent(best) {
                    axis
                } else {
                    best
                }
            })
    }
}
