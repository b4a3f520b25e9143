/// Axis-angle magnitudes below this are treated as no rotation
pub const ROTATION_EPSILON: f64 = 1e-8;

/// Scale from a [0, 1] sample to an 8-bit channel value
pub const QUANTIZATION_SCALE: f32 = 255.0;

/// Renderer executable looked up on PATH when not configured
pub const DEFAULT_RENDERER_BINARY: &str = "blender";

/// Script the renderer runs to produce the three pass artifacts
pub const DEFAULT_RENDER_SCRIPT: &str = "src/scripts/render_frame.py";

/// Log filter used when LOG_LEVEL is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";
