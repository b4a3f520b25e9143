/// Depth channel names in strict lookup priority.
/// Render configurations disagree on naming, so the first match wins and
/// the first declared channel is used when none of these exist.
pub const DEPTH_CHANNEL_PRIORITY: &[&str] = &["Z", "Depth", "R", "G", "B", "A"];

/// Preferred normal channel triplet (vector-named passes)
pub const NORMAL_XYZ_CHANNELS: [&str; 3] = ["X", "Y", "Z"];

/// Fallback normal channel triplet (colour-named passes)
pub const NORMAL_RGB_CHANNELS: [&str; 3] = ["R", "G", "B"];

/// Colour channel triplet, required for every pass
pub const COLOUR_CHANNELS: [&str; 3] = ["R", "G", "B"];

/// Camera-facing normal used when a pass carries no normal channels
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
