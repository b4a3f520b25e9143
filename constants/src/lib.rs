/// Shared constants for render pass decoding and frame reconstruction
pub mod artifact;
pub mod channel;
pub mod render_settings;
