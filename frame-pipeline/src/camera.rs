/// Camera descriptor handed to the renderer and used for reconstruction
use crate::buffer::Dimensions;
use serde::{Deserialize, Deserializer, Serialize};

/// World position followed by an axis-angle rotation: `[x, y, z, rx, ry, rz]`.
/// Direction of `(rx, ry, rz)` is the axis, its magnitude the angle in radians.
pub type Pose = [f64; 6];

/// Pinhole camera parameters in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Default pinhole model for an image with no usable intrinsics.
    /// Focal length is the longer side, principal point the (integer) centre.
    pub fn default_for(dimensions: Dimensions) -> Self {
        let focal = dimensions.width.max(dimensions.height) as f64;
        Self {
            fx: focal,
            fy: focal,
            cx: (dimensions.width / 2) as f64,
            cy: (dimensions.height / 2) as f64,
        }
    }

    /// All components finite and both focal lengths strictly positive
    pub fn is_valid(&self) -> bool {
        [self.fx, self.fy, self.cx, self.cy]
            .iter()
            .all(|value| value.is_finite())
            && self.fx > 0.0
            && self.fy > 0.0
    }
}

/// Collapses an intrinsics object that is partial or carries non-numeric
/// fields to `None`, so the default is applied to all four parameters or
/// none of them.
fn deserialize_intrinsics<'de, D>(deserializer: D) -> Result<Option<Intrinsics>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// Camera identity, pose and optional pinhole intrinsics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: String,
    pub pose: Pose,
    #[serde(default, deserialize_with = "deserialize_intrinsics")]
    pub camera_intrinsics: Option<Intrinsics>,
}

impl Camera {
    pub fn new(id: impl Into<String>, pose: Pose, camera_intrinsics: Option<Intrinsics>) -> Self {
        Self {
            id: id.into(),
            pose,
            camera_intrinsics,
        }
    }

    /// World-space position component of the pose
    pub fn position(&self) -> [f64; 3] {
        [self.pose[0], self.pose[1], self.pose[2]]
    }

    /// Axis-angle rotation component of the pose
    pub fn rotation(&self) -> [f64; 3] {
        [self.pose[3], self.pose[4], self.pose[5]]
    }

    /// Intrinsics to unproject an image of the given size with.
    /// Falls back to `Intrinsics::default_for` unless all four
    /// configured parameters are valid.
    pub fn effective_intrinsics(&self, dimensions: Dimensions) -> Intrinsics {
        match self.camera_intrinsics {
            Some(intrinsics) if intrinsics.is_valid() => intrinsics,
            _ => Intrinsics::default_for(dimensions),
        }
    }

    /// Parse a camera descriptor from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialise to the JSON descriptor consumed by the render script
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
