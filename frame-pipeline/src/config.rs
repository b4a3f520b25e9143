/// Render configuration loaded from JSON with environment overrides.
use crate::error::ConfigError;
use crate::ply::PlyFormat;
use constants::render_settings::{DEFAULT_RENDERER_BINARY, DEFAULT_RENDER_SCRIPT};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `renderer_binary`
pub const RENDERER_BINARY_ENV: &str = "RENDERER_BINARY";
/// Environment variable overriding `scene_path`
pub const RENDER_SCENE_ENV: &str = "RENDER_SCENE";
/// Environment variable overriding `render_script`
pub const RENDER_SCRIPT_ENV: &str = "RENDER_SCRIPT";

/// Settings for invoking the external renderer and exporting frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer executable, resolved through PATH when relative.
    pub renderer_binary: PathBuf,
    /// Scene file opened by the renderer.
    pub scene_path: Option<PathBuf>,
    /// Script the renderer runs to write the pass artifacts.
    pub render_script: PathBuf,
    /// Re-invoke the renderer once after a failed run.
    pub retry_failed_render: bool,
    /// Encoding of exported point clouds.
    pub ply_format: PlyFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            renderer_binary: PathBuf::from(DEFAULT_RENDERER_BINARY),
            scene_path: None,
            render_script: PathBuf::from(DEFAULT_RENDER_SCRIPT),
            retry_failed_render: true,
            ply_format: PlyFormat::default(),
        }
    }
}

impl RenderConfig {
    /// Load a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Apply `RENDERER_BINARY`, `RENDER_SCENE` and `RENDER_SCRIPT`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(binary) = lookup(RENDERER_BINARY_ENV) {
            self.renderer_binary = PathBuf::from(binary);
        }
        if let Some(scene) = lookup(RENDER_SCENE_ENV) {
            self.scene_path = Some(PathBuf::from(scene));
        }
        if let Some(script) = lookup(RENDER_SCRIPT_ENV) {
            self.render_script = PathBuf::from(script);
        }
        self
    }

    /// Configured scene path, required before rendering
    pub fn scene(&self) -> Result<&Path, ConfigError> {
        self.scene_path.as_deref().ok_or(ConfigError::MissingScene)
    }

    /// Number of renderer invocations allowed per frame
    pub fn render_attempts(&self) -> u32 {
        if self.retry_failed_render { 2 } else { 1 }
    }
}
