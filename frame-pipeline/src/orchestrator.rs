/// External renderer invocation around a scoped temporary workspace.
use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::{ConfigError, PipelineError, RenderFailure};
use crate::frame::Frame;
use constants::artifact::DESCRIPTOR_SUFFIX;
use log::{debug, info, warn};
use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::{NamedTempFile, TempDir};
use tokio::process::Command;

/// Lines of renderer stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 20;

/// Something that renders one camera descriptor into pass artifacts.
pub trait Renderer {
    /// Render the camera described by the JSON file at `input`, writing the
    /// colour, depth and normal artifacts into `output_dir`.
    fn render(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> impl Future<Output = Result<(), RenderFailure>> + Send;
}

/// Blender run headless with a render script.
/// `<binary> <scene> --background --python <script> -- --input_path <json> --output_path <dir>`
#[derive(Debug, Clone)]
pub struct BlenderRenderer {
    binary: PathBuf,
    scene: PathBuf,
    script: PathBuf,
}

impl BlenderRenderer {
    pub fn new(binary: impl Into<PathBuf>, scene: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            scene: scene.into(),
            script: script.into(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            &config.renderer_binary,
            config.scene()?,
            &config.render_script,
        ))
    }
}

impl Renderer for BlenderRenderer {
    async fn render(&self, input: &Path, output_dir: &Path) -> Result<(), RenderFailure> {
        debug!(
            "Launching {} for scene {}",
            self.binary.display(),
            self.scene.display()
        );

        // Dropping this future kills the child.
        let output = Command::new(&self.binary)
            .arg(&self.scene)
            .arg("--background")
            .arg("--python")
            .arg(&self.script)
            .arg("--")
            .arg("--input_path")
            .arg(input)
            .arg("--output_path")
            .arg(output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RenderFailure::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("Renderer stdout:\n{}", String::from_utf8_lossy(&output.stdout));
        if !output.status.success() {
            debug!("Renderer stderr:\n{}", stderr);
            return Err(RenderFailure::NonZeroExit {
                code: output.status.code(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(())
    }
}

/// Last `lines` lines of `text`
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

/// Temporary camera descriptor and output directory for one render.
/// Both are removed when the workspace is dropped, whether the render
/// succeeded, failed or was cancelled.
#[derive(Debug)]
pub struct RenderWorkspace {
    descriptor: NamedTempFile,
    output: TempDir,
}

impl RenderWorkspace {
    /// Write the camera descriptor and create an empty output directory.
    pub fn create(camera: &Camera) -> Result<Self, RenderFailure> {
        let json = camera.to_json()?;

        let mut descriptor = tempfile::Builder::new()
            .prefix("camera-")
            .suffix(DESCRIPTOR_SUFFIX)
            .tempfile()
            .map_err(RenderFailure::Workspace)?;
        descriptor
            .write_all(json.as_bytes())
            .and_then(|_| descriptor.flush())
            .map_err(RenderFailure::Workspace)?;

        let output = tempfile::Builder::new()
            .prefix("render-")
            .tempdir()
            .map_err(RenderFailure::Workspace)?;

        debug!(
            "Render workspace: descriptor {}, output {}",
            descriptor.path().display(),
            output.path().display()
        );
        Ok(Self { descriptor, output })
    }

    /// Camera descriptor path handed to the renderer
    pub fn input_path(&self) -> &Path {
        self.descriptor.path()
    }

    /// Directory the renderer writes artifacts into
    pub fn output_dir(&self) -> &Path {
        self.output.path()
    }

    /// Remove everything a previous attempt left in the output directory.
    pub fn clear_output(&self) -> Result<(), RenderFailure> {
        for entry in fs::read_dir(self.output.path()).map_err(RenderFailure::Workspace)? {
            let path = entry.map_err(RenderFailure::Workspace)?.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(RenderFailure::Workspace)?;
        }
        Ok(())
    }
}

impl Drop for RenderWorkspace {
    fn drop(&mut self) {
        debug!("Releasing render workspace {}", self.output.path().display());
    }
}

/// Drives one render per call: workspace, renderer, decode, frame.
/// Holds no state between calls, so concurrent renders are independent.
#[derive(Debug, Clone)]
pub struct RenderOrchestrator<R> {
    renderer: R,
    attempts: u32,
}

impl RenderOrchestrator<BlenderRenderer> {
    /// Orchestrator for the configured Blender installation.
    pub fn from_config(config: &RenderConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(BlenderRenderer::from_config(config)?).with_attempts(config.render_attempts()))
    }
}

impl<R: Renderer> RenderOrchestrator<R> {
    /// Orchestrator that invokes `renderer` once per frame.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            attempts: 1,
        }
    }

    /// Allow up to `attempts` renderer invocations per frame (minimum 1).
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render `camera` and reconstruct the resulting frame.
    /// Renderer failures may be retried; decode failures never are.
    pub async fn render(&self, camera: &Camera) -> Result<Frame, PipelineError> {
        let workspace = RenderWorkspace::create(camera)?;
        info!("Rendering camera {}", camera.id);

        self.invoke(&workspace).await?;
        let frame = Frame::from_artifact_dir(camera, workspace.output_dir())?;

        info!("Reconstructed {} frame for camera {}", frame.dimensions(), camera.id);
        Ok(frame)
    }

    async fn invoke(&self, workspace: &RenderWorkspace) -> Result<(), RenderFailure> {
        let mut attempt = 1;
        loop {
            if attempt > 1 {
                workspace.clear_output()?;
            }
            match self
                .renderer
                .render(workspace.input_path(), workspace.output_dir())
                .await
            {
                Ok(()) => return Ok(()),
                Err(failure) if attempt < self.attempts => {
                    warn!(
                        "Render attempt {}/{} failed: {}",
                        attempt, self.attempts, failure
                    );
                    attempt += 1;
                }
                Err(failure) => return Err(failure),
            }
        }
    }
}
