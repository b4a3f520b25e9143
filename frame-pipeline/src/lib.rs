//! Render frame reconstruction: decode pass artifacts, rebuild geometry,
//! export rasters and point clouds.
pub mod buffer;
pub mod camera;
pub mod config;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod orchestrator;
pub mod ply;
pub mod raster;
pub mod reconstruct;
pub mod registry;

pub use buffer::{ChannelBuffer, DepthBuffer, Dimensions, VectorBuffer};
pub use camera::{Camera, Intrinsics, Pose};
pub use config::RenderConfig;
pub use error::{DecodeError, EncodeError, PipelineError, RenderFailure};
pub use frame::{Frame, FrameOutputs};
pub use orchestrator::{BlenderRenderer, RenderOrchestrator, RenderWorkspace, Renderer};
pub use ply::PlyFormat;
pub use registry::SceneRegistry;
