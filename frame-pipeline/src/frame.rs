/// Reconstructed render pass and its exports.
use crate::buffer::{DepthBuffer, Dimensions, VectorBuffer};
use crate::camera::Camera;
use crate::decoder::{DecodedPass, decode_pass_dir};
use crate::error::{ChannelGroup, DecodeError, EncodeError};
use crate::ply::{self, PlyFormat};
use crate::raster::encode_png;
use crate::reconstruct::world_to_camera_normals;
use constants::artifact::{COLOUR_PNG, DEPTH_PNG, NORMAL_PNG, POINT_CLOUD_PLY};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// One render pass for one camera: depth, camera-space normals and colour.
/// Immutable once built; encoders only read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    camera: Camera,
    depth: DepthBuffer,
    normal: VectorBuffer,
    colour: VectorBuffer,
}

/// Paths written by `Frame::write_outputs`.
#[derive(Debug, Clone)]
pub struct FrameOutputs {
    pub depth_png: PathBuf,
    pub normal_png: PathBuf,
    pub colour_png: PathBuf,
    pub point_cloud: PathBuf,
}

impl Frame {
    /// Build a frame from buffers that share one shape.
    /// `normal` must already be in camera space.
    pub fn new(
        camera: Camera,
        depth: DepthBuffer,
        normal: VectorBuffer,
        colour: VectorBuffer,
    ) -> Result<Self, DecodeError> {
        let expected = colour.dimensions();
        for (group, found) in [
            (ChannelGroup::Depth, depth.dimensions()),
            (ChannelGroup::Normal, normal.dimensions()),
        ] {
            if found != expected {
                return Err(DecodeError::ShapeMismatch {
                    group,
                    expected,
                    found,
                });
            }
        }

        Ok(Self {
            camera,
            depth,
            normal,
            colour,
        })
    }

    /// Build a frame from a decoded pass, re-basing its world-space normals
    /// into the camera's frame. The default fill already faces the camera
    /// and is kept as is.
    pub fn from_pass(camera: &Camera, pass: DecodedPass) -> Result<Self, DecodeError> {
        let normal = if pass.normal_is_default {
            pass.normal
        } else {
            world_to_camera_normals(&pass.normal, camera)
        };
        Self::new(camera.clone(), pass.depth, normal, pass.colour)
    }

    /// Decode the artifacts a render wrote into `dir` and build the frame.
    pub fn from_artifact_dir(camera: &Camera, dir: &Path) -> Result<Self, DecodeError> {
        Self::from_pass(camera, decode_pass_dir(dir)?)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn normal(&self) -> &VectorBuffer {
        &self.normal
    }

    pub fn colour(&self) -> &VectorBuffer {
        &self.colour
    }

    pub fn dimensions(&self) -> Dimensions {
        self.colour.dimensions()
    }

    pub fn to_depth_png(&self) -> Result<Vec<u8>, EncodeError> {
        encode_png(&self.depth)
    }

    pub fn to_normal_png(&self) -> Result<Vec<u8>, EncodeError> {
        encode_png(&self.normal)
    }

    pub fn to_colour_png(&self) -> Result<Vec<u8>, EncodeError> {
        encode_png(&self.colour)
    }

    pub fn to_ply(&self, format: PlyFormat) -> Result<Vec<u8>, EncodeError> {
        ply::encode(self, format)
    }

    /// Write the three PNGs and the point cloud into `dir`.
    /// Everything is encoded before the first file is written.
    pub fn write_outputs(&self, dir: &Path, format: PlyFormat) -> Result<FrameOutputs, EncodeError> {
        let depth = self.to_depth_png()?;
        let normal = self.to_normal_png()?;
        let colour = self.to_colour_png()?;
        let points = self.to_ply(format)?;

        fs::create_dir_all(dir)?;
        let outputs = FrameOutputs {
            depth_png: dir.join(DEPTH_PNG),
            normal_png: dir.join(NORMAL_PNG),
            colour_png: dir.join(COLOUR_PNG),
            point_cloud: dir.join(POINT_CLOUD_PLY),
        };

        fs::write(&outputs.depth_png, depth)?;
        fs::write(&outputs.normal_png, normal)?;
        fs::write(&outputs.colour_png, colour)?;
        fs::write(&outputs.point_cloud, points)?;

        info!(
            "Saved frame for camera {} ({}) to {}",
            self.camera.id,
            self.dimensions(),
            dir.display()
        );
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::channel::DEFAULT_NORMAL;

    fn camera() -> Camera {
        Camera::new("test", [0.0; 6], None)
    }

    #[test]
    fn rejects_buffers_of_different_shapes() {
        let result = Frame::new(
            camera(),
            DepthBuffer::filled(Dimensions::new(2, 2), 1.0),
            VectorBuffer::filled(Dimensions::new(2, 2), [0.0, 0.0, 1.0]),
            VectorBuffer::filled(Dimensions::new(2, 3), [0.5; 3]),
        );
        assert!(matches!(
            result,
            Err(DecodeError::ShapeMismatch {
                group: ChannelGroup::Depth,
                ..
            })
        ));
    }

    #[test]
    fn from_pass_rebases_normals() {
        let dimensions = Dimensions::new(1, 1);
        let pass = DecodedPass {
            depth: DepthBuffer::filled(dimensions, 1.0),
            normal: VectorBuffer::filled(dimensions, [1.0, 0.0, 0.0]),
            colour: VectorBuffer::filled(dimensions, [0.0; 3]),
            normal_is_default: false,
        };
        let camera = Camera::new("c", [0.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::PI], None);

        let frame = Frame::from_pass(&camera, pass).unwrap();
        let [x, _, _] = frame.normal().as_slice()[0];
        assert!((x + 1.0).abs() < 1e-6);
    }

    #[test]
    fn default_normal_stays_camera_facing() {
        let dimensions = Dimensions::new(2, 1);
        let pass = DecodedPass {
            depth: DepthBuffer::filled(dimensions, 1.0),
            normal: VectorBuffer::filled(dimensions, DEFAULT_NORMAL),
            colour: VectorBuffer::filled(dimensions, [0.0; 3]),
            normal_is_default: true,
        };
        let camera = Camera::new("c", [0.0, 0.0, 0.0, std::f64::consts::PI, 0.0, 0.0], None);

        let frame = Frame::from_pass(&camera, pass).unwrap();
        assert_eq!(frame.normal().as_slice(), &[DEFAULT_NORMAL, DEFAULT_NORMAL]);
    }

    #[test]
    fn write_outputs_creates_all_files() {
        let dimensions = Dimensions::new(2, 2);
        let frame = Frame::new(
            camera(),
            DepthBuffer::filled(dimensions, 1.0),
            VectorBuffer::filled(dimensions, [0.0, 0.0, 1.0]),
            VectorBuffer::filled(dimensions, [0.5; 3]),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let outputs = frame
            .write_outputs(&dir.path().join("frame"), PlyFormat::Ascii)
            .unwrap();

        for path in [
            &outputs.depth_png,
            &outputs.normal_png,
            &outputs.colour_png,
            &outputs.point_cloud,
        ] {
            assert!(path.is_file(), "{} missing", path.display());
        }
        let ply = fs::read_to_string(&outputs.point_cloud).unwrap();
        assert!(ply.contains("element vertex 4\n"));
    }
}
