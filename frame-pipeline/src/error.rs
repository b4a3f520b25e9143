/// Error types for decoding, rendering, encoding and configuration.
use crate::buffer::Dimensions;
use std::path::PathBuf;
use thiserror::Error;

/// Channel group of a render pass, used to attribute decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelGroup {
    Colour,
    Depth,
    Normal,
}

impl std::fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelGroup::Colour => write!(f, "colour"),
            ChannelGroup::Depth => write!(f, "depth"),
            ChannelGroup::Normal => write!(f, "normal"),
        }
    }
}

/// Failures turning render pass artifacts into channel buffers.
/// All variants are fatal and never retried.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },

    #[error("failed to read artifact from memory: {0}")]
    Buffer(#[source] exr::error::Error),

    #[error("artifact declares no layers")]
    NoLayers,

    #[error("{group} artifact is missing required channel(s) {channels}")]
    MissingChannel {
        group: ChannelGroup,
        channels: String,
    },

    #[error("channel '{channel}' holds {found} samples, expected {expected}")]
    SampleCount {
        channel: String,
        expected: usize,
        found: usize,
    },

    #[error("{group} artifact is {found}, expected {expected}")]
    ShapeMismatch {
        group: ChannelGroup,
        expected: Dimensions,
        found: Dimensions,
    },
}

/// External renderer invocation failures.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("failed to prepare render workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("failed to serialise camera descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error("failed to launch renderer '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Failures producing PNG or PLY output.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no scene path configured (set scene_path, RENDER_SCENE or --scene)")]
    MissingScene,
}

/// Registry lookups against unknown identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    #[error("camera not found: {0}")]
    CameraNotFound(String),
}

/// Umbrella error for callers driving a whole render.
/// Keeps every failure kind distinguishable for response mapping.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Render(#[from] RenderFailure),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
