/// Fixed per-pass artifact names written by the render script.
/// Frame number is always the first frame of the scene.
pub const COLOUR_ARTIFACT: &str = "frame_color_0001.exr";
pub const DEPTH_ARTIFACT: &str = "frame_depth_0001.exr";
pub const NORMAL_ARTIFACT: &str = "frame_normal_0001.exr";

/// Exported file names for a reconstructed frame
pub const DEPTH_PNG: &str = "depth.png";
pub const NORMAL_PNG: &str = "normal.png";
pub const COLOUR_PNG: &str = "color.png";
pub const POINT_CLOUD_PLY: &str = "points.ply";

/// Suffix of the temporary camera descriptor handed to the renderer
pub const DESCRIPTOR_SUFFIX: &str = ".json";
