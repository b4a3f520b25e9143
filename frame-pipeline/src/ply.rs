//! PLY point cloud export of a reconstructed frame.
//!
//! Every pixel with a positive, finite depth becomes one vertex carrying its
//! camera-space position, camera-space normal and 8-bit colour:
//!
//! ```text
//! element vertex <N>
//! property float x | y | z | nx | ny | nz
//! property uchar red | green | blue
//! ```
//!
//! Both `ascii 1.0` and `binary_little_endian 1.0` bodies are supported.
//! Output is a pure function of the frame: vertices follow row-major pixel
//! order, so encoding the same frame twice gives identical bytes.

use crate::error::EncodeError;
use crate::frame::Frame;
use crate::raster::quantize;
use crate::reconstruct::unproject;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// PLY body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyFormat {
    Ascii,
    #[default]
    BinaryLittleEndian,
}

impl PlyFormat {
    fn header_name(&self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
        }
    }
}

/// One emitted vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub colour: [u8; 3],
}

/// Depth values that produce a vertex
pub fn is_valid_depth(depth: f32) -> bool {
    depth.is_finite() && depth > 0.0
}

/// Collect the vertices of `frame` in row-major pixel order.
/// Pixels with non-positive or non-finite depth are skipped.
pub fn frame_points(frame: &Frame) -> Vec<Point> {
    let intrinsics = frame.camera().effective_intrinsics(frame.dimensions());
    let positions = unproject(frame.depth(), &intrinsics);

    frame
        .depth()
        .as_slice()
        .iter()
        .zip(positions.as_slice())
        .zip(frame.normal().as_slice())
        .zip(frame.colour().as_slice())
        .filter(|(((depth, _), _), _)| is_valid_depth(**depth))
        .map(|(((_, position), normal), colour)| Point {
            position: *position,
            normal: *normal,
            colour: colour.map(quantize),
        })
        .collect()
}

/// Serialise `points` as a PLY file.
pub fn encode_points(points: &[Point], format: PlyFormat) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(256 + points.len() * 27);
    write_header(&mut out, points.len(), format)?;

    match format {
        PlyFormat::Ascii => {
            for point in points {
                let [x, y, z] = point.position;
                let [nx, ny, nz] = point.normal;
                let [r, g, b] = point.colour;
                writeln!(out, "{} {} {} {} {} {} {} {} {}", x, y, z, nx, ny, nz, r, g, b)?;
            }
        }
        PlyFormat::BinaryLittleEndian => {
            for point in points {
                for value in point.position.iter().chain(point.normal.iter()) {
                    out.extend_from_slice(&value.to_le_bytes());
                }
                out.extend_from_slice(&point.colour);
            }
        }
    }

    Ok(out)
}

fn write_header(out: &mut Vec<u8>, vertex_count: usize, format: PlyFormat) -> std::io::Result<()> {
    writeln!(out, "ply")?;
    writeln!(out, "format {} 1.0", format.header_name())?;
    writeln!(out, "element vertex {}", vertex_count)?;
    for name in ["x", "y", "z", "nx", "ny", "nz"] {
        writeln!(out, "property float {}", name)?;
    }
    for name in ["red", "green", "blue"] {
        writeln!(out, "property uchar {}", name)?;
    }
    writeln!(out, "end_header")
}

/// Encode the point cloud of `frame`.
pub fn encode(frame: &Frame, format: PlyFormat) -> Result<Vec<u8>, EncodeError> {
    encode_points(&frame_points(frame), format)
}

/// Encode the point cloud of `frame` and write it to `path`.
pub fn save_ply(frame: &Frame, format: PlyFormat, path: &Path) -> Result<(), EncodeError> {
    std::fs::write(path, encode(frame, format)?)?;
    Ok(())
}
