//! Edit operations as serializable parameter sets.
//!
//! Each variant of [`EditOperation`] is one JSON object tagged by its
//! `operation` key. Missing parameters take their defaults, so
//! `{"operation": "cut"}` is a 50 % XY cut keeping the upper half.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MeshError;
use crate::mesh::Axis;

/// Reference plane for a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutPlane {
    /// Horizontal plane, moved along Z.
    #[default]
    Xy,
    /// Plane moved along Y.
    Xz,
    /// Plane moved along X.
    Yz,
    /// Any other name: a Y-normal plane through the centroid, position ignored.
    #[serde(other)]
    Other,
}

impl CutPlane {
    /// Parse a plane name; unknown names map to [`CutPlane::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "xy" => CutPlane::Xy,
            "xz" => CutPlane::Xz,
            "yz" => CutPlane::Yz,
            _ => CutPlane::Other,
        }
    }

    /// Axis the plane is normal to, if it is one of the named planes.
    pub fn axis(self) -> Option<Axis> {
        match self {
            CutPlane::Xy => Some(Axis::Z),
            CutPlane::Xz => Some(Axis::Y),
            CutPlane::Yz => Some(Axis::X),
            CutPlane::Other => None,
        }
    }
}

/// Which side of the cut plane survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutDirection {
    /// Keep the side opposite the plane normal.
    Below,
    /// Keep the side the plane normal points into. Unknown names land here.
    #[default]
    #[serde(other)]
    Above,
}

impl CutDirection {
    /// Parse a direction; anything but `below` keeps the upper side.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("below") {
            CutDirection::Below
        } else {
            CutDirection::Above
        }
    }
}

/// Parameters of a planar cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutSpec {
    /// Reference plane.
    #[serde(rename = "cut_plane", alias = "plane")]
    pub plane: CutPlane,

    /// Offset along the plane axis as a percentage of the bounding-box
    /// extent; 50 passes through the centroid.
    pub position: f64,

    /// Side that survives.
    pub direction: CutDirection,

    /// Tilt of the plane normal about X, in degrees.
    pub tilt_x: f64,

    /// Tilt of the plane normal about Y, in degrees, applied after `tilt_x`.
    pub tilt_y: f64,
}

impl Default for CutSpec {
    fn default() -> Self {
        Self {
            plane: CutPlane::Xy,
            position: 50.0,
            direction: CutDirection::Above,
            tilt_x: 0.0,
            tilt_y: 0.0,
        }
    }
}

impl CutSpec {
    /// A centered cut on `plane`.
    pub fn new(plane: CutPlane) -> Self {
        Self {
            plane,
            ..Self::default()
        }
    }

    /// Set the position percentage.
    pub fn at(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    /// Set which side survives.
    pub fn keep(mut self, direction: CutDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set both tilts, in degrees.
    pub fn tilted(mut self, tilt_x: f64, tilt_y: f64) -> Self {
        self.tilt_x = tilt_x;
        self.tilt_y = tilt_y;
        self
    }
}

fn default_iterations() -> usize {
    5
}

/// One edit, as exchanged with callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EditOperation {
    /// Rotate about X, then Y, then Z (degrees).
    Rotate {
        #[serde(default)]
        x_angle: f64,
        #[serde(default)]
        y_angle: f64,
        #[serde(default)]
        z_angle: f64,
    },
    /// Planar cut with capping.
    Cut(CutSpec),
    /// Laplacian smoothing.
    Smooth {
        #[serde(default = "default_iterations")]
        iterations: usize,
    },
    /// Close boundary loops.
    FillHoles,
    /// Accepted but has no defined algorithm.
    Ovalize {
        #[serde(flatten)]
        params: Map<String, Value>,
    },
    /// Accepted but has no defined algorithm.
    Drill {
        #[serde(flatten)]
        params: Map<String, Value>,
    },
}

impl EditOperation {
    /// Parse a JSON array of operations.
    ///
    /// Malformed JSON and unknown operations are reported as
    /// [`MeshError::Json`].
    pub fn parse_list(json: &str) -> crate::error::Result<Vec<Self>> {
        let ops: Vec<Self> = serde_json::from_str(json)?;
        log::debug!("Parsed {} operations", ops.len());
        Ok(ops)
    }

    /// Operation name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::Rotate { .. } => "rotate",
            EditOperation::Cut(_) => "cut",
            EditOperation::Smooth { .. } => "smooth",
            EditOperation::FillHoles => "fill_holes",
            EditOperation::Ovalize { .. } => "ovalize",
            EditOperation::Drill { .. } => "drill",
        }
    }

    /// Step type recorded for the operation's history entry.
    pub fn step_type(&self) -> &'static str {
        match self {
            EditOperation::Rotate { .. } => "rotation",
            EditOperation::Cut(_) => "cutting",
            EditOperation::Smooth { .. } => "smoothing",
            EditOperation::FillHoles => "fill_holes",
            EditOperation::Ovalize { .. } => "ovalization",
            EditOperation::Drill { .. } => "drilling",
        }
    }
}

/// Result of applying one operation, from which callers build their history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// Step type, see [`EditOperation::step_type`].
    pub operation: &'static str,
    /// Whether the edit and its export both succeeded.
    pub success: bool,
    /// Exported mesh, when the step succeeded.
    pub output: Option<PathBuf>,
    /// Wall-clock seconds spent on the step, export included.
    pub execution_time: f64,
    /// Failure message, when the step failed.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipeline() {
        let json = r#"[
            {"operation": "rotate", "z_angle": 90},
            {"operation": "cut", "cut_plane": "xz", "position": 25, "direction": "below"},
            {"operation": "cut"},
            {"operation": "smooth"},
            {"operation": "fill_holes"},
            {"operation": "drill", "diameter": 2.0}
        ]"#;
        let ops: Vec<EditOperation> = serde_json::from_str(json).unwrap();

        assert_eq!(
            ops[0],
            EditOperation::Rotate {
                x_angle: 0.0,
                y_angle: 0.0,
                z_angle: 90.0
            }
        );
        assert_eq!(
            ops[1],
            EditOperation::Cut(CutSpec::new(CutPlane::Xz).at(25.0).keep(CutDirection::Below))
        );
        assert_eq!(ops[2], EditOperation::Cut(CutSpec::default()));
        assert_eq!(ops[3], EditOperation::Smooth { iterations: 5 });
        assert_eq!(ops[4], EditOperation::FillHoles);

        match &ops[5] {
            EditOperation::Drill { params } => assert_eq!(params["diameter"], 2.0),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ops[5].step_type(), "drilling");
    }

    #[test]
    fn test_unknown_names_fall_back() {
        let spec: CutSpec =
            serde_json::from_str(r#"{"plane": "diagonal", "direction": "sideways"}"#).unwrap();
        assert_eq!(spec.plane, CutPlane::Other);
        assert_eq!(spec.direction, CutDirection::Above);
        assert_eq!(spec.plane.axis(), None);

        assert_eq!(CutPlane::from_name("YZ"), CutPlane::Yz);
        assert_eq!(CutDirection::from_name("Below"), CutDirection::Below);
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let result: Result<EditOperation, _> = serde_json::from_str(r#"{"operation": "melt"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list() {
        let ops = EditOperation::parse_list(r#"[{"operation": "fill_holes"}, {"operation": "cut"}]"#)
            .unwrap();
        assert_eq!(ops, vec![EditOperation::FillHoles, EditOperation::Cut(CutSpec::default())]);

        let err = EditOperation::parse_list(r#"[{"operation": "rotate""#).unwrap_err();
        assert!(matches!(err, MeshError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));

        let err = EditOperation::parse_list(r#"{"operation": "rotate"}"#).unwrap_err();
        assert!(matches!(err, MeshError::Json(_)));
    }
}
