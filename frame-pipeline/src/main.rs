/// Render frame command line entry point
use clap::{Parser, Subcommand, ValueEnum};
use constants::render_settings::DEFAULT_LOG_LEVEL;
use env_logger::{Builder, Env};
use frame_pipeline::{BlenderRenderer, Camera, Frame, PlyFormat, RenderConfig, RenderOrchestrator};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "render-frame", version, about = "Render a camera and export depth, normals, colour and points")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one camera with the external renderer and export the frame
    Render {
        /// Camera descriptor JSON
        #[arg(long)]
        camera: PathBuf,
        /// Render config JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Scene file, overrides config and environment
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum)]
        ply_format: Option<FormatArg>,
    },
    /// Reconstruct frames from artifact directories that were already rendered
    Convert {
        #[arg(long)]
        camera: PathBuf,
        /// Directories holding the colour, depth and normal artifacts
        #[arg(long, num_args = 1.., required = true)]
        artifacts: Vec<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum)]
        ply_format: Option<FormatArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Ascii,
    Binary,
}

impl From<FormatArg> for PlyFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ascii => PlyFormat::Ascii,
            FormatArg::Binary => PlyFormat::BinaryLittleEndian,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_env(Env::default().filter_or("LOG_LEVEL", DEFAULT_LOG_LEVEL)).init();

    match Cli::parse().command {
        Command::Render {
            camera,
            config,
            scene,
            out,
            ply_format,
        } => {
            let mut config = match config {
                Some(path) => RenderConfig::from_file(&path)?,
                None => RenderConfig::default(),
            }
            .with_env_overrides();
            if let Some(scene) = scene {
                config.scene_path = Some(scene);
            }
            if let Some(format) = ply_format {
                config.ply_format = format.into();
            }
            render(&read_camera(&camera)?, &config, &out)
        }
        Command::Convert {
            camera,
            artifacts,
            out,
            ply_format,
        } => {
            let format = ply_format.map(PlyFormat::from).unwrap_or_default();
            convert(&read_camera(&camera)?, &artifacts, &out, format)
        }
    }
}

fn read_camera(path: &Path) -> Result<Camera, Box<dyn std::error::Error>> {
    Ok(Camera::from_json(&fs::read_to_string(path)?)?)
}

fn render(camera: &Camera, config: &RenderConfig, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = RenderOrchestrator::<BlenderRenderer>::from_config(config)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {elapsed} {msg}")?);
    spinner.set_message(format!("Rendering camera {}", camera.id));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = runtime.block_on(orchestrator.render(camera));
    spinner.finish_and_clear();

    let frame = result?;
    let outputs = frame.write_outputs(out, config.ply_format)?;
    info!("Point cloud written to {}", outputs.point_cloud.display());
    Ok(())
}

fn convert(
    camera: &Camera,
    artifacts: &[PathBuf],
    out: &Path,
    format: PlyFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(artifacts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Reconstructing");

    let failures: Vec<String> = artifacts
        .par_iter()
        .enumerate()
        .filter_map(|(index, dir)| {
            let target = out.join(output_name(dir, index));
            let result = Frame::from_artifact_dir(camera, dir)
                .map_err(|e| e.to_string())
                .and_then(|frame| frame.write_outputs(&target, format).map_err(|e| e.to_string()));
            pb.inc(1);
            result.err().map(|message| {
                error!("{}: {}", dir.display(), message);
                format!("{}: {}", dir.display(), message)
            })
        })
        .collect();
    pb.finish_with_message("Done");

    if failures.is_empty() {
        info!("Converted {} artifact directories", artifacts.len());
        Ok(())
    } else {
        Err(format!("{} of {} conversions failed", failures.len(), artifacts.len()).into())
    }
}

/// Output subdirectory for one artifact directory
fn output_name(dir: &Path, index: usize) -> String {
    match dir.file_name() {
        Some(name) => format!("{:03}_{}", index, name.to_string_lossy()),
        None => format!("{:03}", index),
    }
}
