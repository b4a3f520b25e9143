//! EXR fixture helpers shared by the integration tests.
#![allow(dead_code)]

use constants::artifact::{COLOUR_ARTIFACT, DEPTH_ARTIFACT, NORMAL_ARTIFACT};
use exr::prelude::*;
use std::path::Path;

/// Write a single-layer f32 EXR with the given named channels.
pub fn write_exr(path: &Path, width: usize, height: usize, channels: &[(&str, Vec<f32>)]) {
    write_exr_samples(
        path,
        width,
        height,
        channels
            .iter()
            .map(|(name, samples)| (*name, FlatSamples::F32(samples.clone())))
            .collect(),
    );
}

/// Write a single-layer EXR keeping each channel's sample type.
pub fn write_exr_samples(path: &Path, width: usize, height: usize, channels: Vec<(&str, FlatSamples)>) {
    let list: Vec<AnyChannel<FlatSamples>> = channels
        .into_iter()
        .map(|(name, samples)| AnyChannel::new(name, samples))
        .collect();

    Image::from_channels((width, height), AnyChannels::sort(list.into()))
        .write()
        .to_file(path)
        .expect("failed to write EXR fixture");
}

fn planes(vectors: &[[f32; 3]]) -> [Vec<f32>; 3] {
    [0, 1, 2].map(|axis| vectors.iter().map(|v| v[axis]).collect())
}

/// Write the three pass artifacts a render leaves in its output directory.
pub fn write_pass(
    dir: &Path,
    width: usize,
    height: usize,
    depth: Vec<f32>,
    normal: &[[f32; 3]],
    colour: &[[f32; 3]],
) {
    write_exr(&dir.join(DEPTH_ARTIFACT), width, height, &[("Z", depth)]);

    let [nx, ny, nz] = planes(normal);
    write_exr(
        &dir.join(NORMAL_ARTIFACT),
        width,
        height,
        &[("X", nx), ("Y", ny), ("Z", nz)],
    );

    let [r, g, b] = planes(colour);
    write_exr(
        &dir.join(COLOUR_ARTIFACT),
        width,
        height,
        &[("R", r), ("G", g), ("B", b), ("A", vec![1.0; width * height])],
    );
}

/// Uniform pass with constant depth, a +Z normal and mid-grey colour.
pub fn write_uniform_pass(dir: &Path, width: usize, height: usize, depth: f32) {
    let pixels = width * height;
    write_pass(
        dir,
        width,
        height,
        vec![depth; pixels],
        &vec![[0.0, 0.0, 1.0]; pixels],
        &vec![[0.5, 0.5, 0.5]; pixels],
    );
}

/// Split a PLY file into its header text and body bytes.
pub fn split_ply(bytes: &[u8]) -> (String, Vec<u8>) {
    let marker = b"end_header\n";
    let end = bytes
        .windows(marker.len())
        .position(|window| window == marker)
        .expect("PLY header not terminated")
        + marker.len();
    (
        String::from_utf8(bytes[..end].to_vec()).expect("PLY header is not UTF-8"),
        bytes[end..].to_vec(),
    )
}
