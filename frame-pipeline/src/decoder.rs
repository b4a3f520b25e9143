/// Render pass artifact decoding into shape-checked channel buffers.
use crate::buffer::{DepthBuffer, Dimensions, VectorBuffer};
use crate::error::{ChannelGroup, DecodeError};
use constants::artifact::{COLOUR_ARTIFACT, DEPTH_ARTIFACT, NORMAL_ARTIFACT};
use constants::channel::{
    COLOUR_CHANNELS, DEFAULT_NORMAL, DEPTH_CHANNEL_PRIORITY, NORMAL_RGB_CHANNELS,
    NORMAL_XYZ_CHANNELS,
};
use exr::image::{AnyChannels, FlatSamples, Image, Layers};
use exr::prelude::{ReadChannels, ReadLayers};
use log::{debug, warn};
use std::io::Cursor;
use std::path::Path;

type FlatExrImage = Image<Layers<AnyChannels<FlatSamples>>>;

/// One named channel of an artifact, widened to f32.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedChannel {
    pub name: String,
    pub samples: Vec<f32>,
}

impl NamedChannel {
    pub fn new(name: impl Into<String>, samples: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }
}

/// Decoded contents of one channel-group artifact.
/// Channels keep the order the artifact declares them in.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelArtifact {
    dimensions: Dimensions,
    channels: Vec<NamedChannel>,
}

impl ChannelArtifact {
    pub fn new(dimensions: Dimensions, channels: Vec<NamedChannel>) -> Self {
        Self {
            dimensions,
            channels,
        }
    }

    /// Read an OpenEXR artifact from disk.
    pub fn from_exr_file(path: &Path) -> Result<Self, DecodeError> {
        let image = exr::prelude::read()
            .no_deep_data()
            .largest_resolution_level()
            .all_channels()
            .all_layers()
            .all_attributes()
            .from_file(path)
            .map_err(|source| DecodeError::Artifact {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Read artifact {}", path.display());
        Self::from_exr_image(image)
    }

    /// Read an OpenEXR artifact held in memory.
    pub fn from_exr_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let image = exr::prelude::read()
            .no_deep_data()
            .largest_resolution_level()
            .all_channels()
            .all_layers()
            .all_attributes()
            .from_buffered(Cursor::new(bytes))
            .map_err(DecodeError::Buffer)?;

        Self::from_exr_image(image)
    }

    /// Uses the first layer's data window and channels.
    /// Render passes are written as single-part files.
    fn from_exr_image(image: FlatExrImage) -> Result<Self, DecodeError> {
        let layer = image
            .layer_data
            .into_iter()
            .next()
            .ok_or(DecodeError::NoLayers)?;

        let dimensions = Dimensions::new(layer.size.0, layer.size.1);
        let channels = layer
            .channel_data
            .list
            .into_iter()
            .map(|channel| {
                let samples = match channel.sample_data {
                    FlatSamples::F16(values) => values.iter().map(|v| v.to_f32()).collect(),
                    FlatSamples::F32(values) => values,
                    FlatSamples::U32(values) => values.iter().map(|&v| v as f32).collect(),
                };
                NamedChannel::new(channel.name.to_string(), samples)
            })
            .collect();

        Ok(Self {
            dimensions,
            channels,
        })
    }

    /// Data window width and height
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Channel names in declaration order
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|channel| channel.name.as_str())
    }

    /// Samples of the channel called `name`
    pub fn channel(&self, name: &str) -> Option<&NamedChannel> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    /// All three channels of a triplet, or `None` if any is absent
    fn triplet(&self, names: [&str; 3]) -> Option<[&NamedChannel; 3]> {
        Some([
            self.channel(names[0])?,
            self.channel(names[1])?,
            self.channel(names[2])?,
        ])
    }

    fn sample_count_error(&self, channel: &NamedChannel) -> DecodeError {
        DecodeError::SampleCount {
            channel: channel.name.clone(),
            expected: self.dimensions.pixel_count(),
            found: channel.samples.len(),
        }
    }

    fn scalar_buffer(&self, channel: &NamedChannel) -> Result<DepthBuffer, DecodeError> {
        DepthBuffer::from_vec(self.dimensions, channel.samples.clone())
            .ok_or_else(|| self.sample_count_error(channel))
    }

    fn vector_buffer(&self, channels: [&NamedChannel; 3]) -> Result<VectorBuffer, DecodeError> {
        if let Some(short) = channels
            .iter()
            .find(|channel| channel.samples.len() != self.dimensions.pixel_count())
        {
            return Err(self.sample_count_error(short));
        }

        let planes = channels.map(|channel| channel.samples.as_slice());
        VectorBuffer::from_planes(self.dimensions, planes)
            .ok_or_else(|| self.sample_count_error(channels[0]))
    }
}

/// Depth, world-space normal and colour buffers of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPass {
    pub depth: DepthBuffer,
    pub normal: VectorBuffer,
    pub colour: VectorBuffer,
    /// `normal` is the camera-facing fill rather than world-space data
    pub normal_is_default: bool,
}

/// Picks the depth channel: first hit in `DEPTH_CHANNEL_PRIORITY`,
/// otherwise the first declared channel.
pub fn select_depth_channel(artifact: &ChannelArtifact) -> Option<&NamedChannel> {
    DEPTH_CHANNEL_PRIORITY
        .iter()
        .find_map(|name| artifact.channel(name))
        .or_else(|| {
            let fallback = artifact.channels.first();
            if let Some(channel) = fallback {
                warn!(
                    "No known depth channel, falling back to '{}'",
                    channel.name
                );
            }
            fallback
        })
}

/// Decode the depth channel group into an H×W buffer.
pub fn decode_depth(artifact: &ChannelArtifact) -> Result<DepthBuffer, DecodeError> {
    let channel = select_depth_channel(artifact).ok_or_else(|| DecodeError::MissingChannel {
        group: ChannelGroup::Depth,
        channels: DEPTH_CHANNEL_PRIORITY.join(", "),
    })?;
    debug!("Depth channel: {}", channel.name);

    artifact.scalar_buffer(channel)
}

/// `X,Y,Z` if present, otherwise `R,G,B`.
fn normal_channels(artifact: &ChannelArtifact) -> Option<[&NamedChannel; 3]> {
    artifact.triplet(NORMAL_XYZ_CHANNELS).or_else(|| {
        let channels = artifact.triplet(NORMAL_RGB_CHANNELS);
        if channels.is_some() {
            debug!("Normal pass is RGB-encoded");
        }
        channels
    })
}

/// Whether the normal artifact carries a usable channel triplet.
/// Without one the pass gets the camera-facing default normal.
pub fn has_normal_channels(artifact: &ChannelArtifact) -> bool {
    artifact.triplet(NORMAL_XYZ_CHANNELS).is_some() || artifact.triplet(NORMAL_RGB_CHANNELS).is_some()
}

/// Decode the normal channel group into an H×W×3 buffer.
/// Prefers `X,Y,Z`, accepts `R,G,B`, and otherwise fills every pixel with
/// the camera-facing default normal.
pub fn decode_normal(artifact: &ChannelArtifact) -> Result<VectorBuffer, DecodeError> {
    if let Some(channels) = normal_channels(artifact) {
        return artifact.vector_buffer(channels);
    }

    warn!(
        "Normal pass has no XYZ or RGB channels, using default normal {:?}",
        DEFAULT_NORMAL
    );
    Ok(VectorBuffer::filled(artifact.dimensions, DEFAULT_NORMAL))
}

/// Decode the colour channel group into an H×W×3 buffer.
/// An `R,G,B` triplet is required.
pub fn decode_colour(artifact: &ChannelArtifact) -> Result<VectorBuffer, DecodeError> {
    let channels =
        artifact
            .triplet(COLOUR_CHANNELS)
            .ok_or_else(|| DecodeError::MissingChannel {
                group: ChannelGroup::Colour,
                channels: COLOUR_CHANNELS.join(", "),
            })?;
    artifact.vector_buffer(channels)
}

/// Decode the three artifacts of one pass.
/// Data windows are compared before any buffer is built, so a shape
/// mismatch yields no partial output.
pub fn decode_pass(
    colour: &ChannelArtifact,
    depth: &ChannelArtifact,
    normal: &ChannelArtifact,
) -> Result<DecodedPass, DecodeError> {
    let expected = colour.dimensions();
    for (group, artifact) in [(ChannelGroup::Depth, depth), (ChannelGroup::Normal, normal)] {
        if artifact.dimensions() != expected {
            return Err(DecodeError::ShapeMismatch {
                group,
                expected,
                found: artifact.dimensions(),
            });
        }
    }

    Ok(DecodedPass {
        depth: decode_depth(depth)?,
        normal: decode_normal(normal)?,
        colour: decode_colour(colour)?,
        normal_is_default: !has_normal_channels(normal),
    })
}

/// Read and decode the fixed-name artifacts a render wrote into `dir`.
pub fn decode_pass_dir(dir: &Path) -> Result<DecodedPass, DecodeError> {
    let colour = ChannelArtifact::from_exr_file(&dir.join(COLOUR_ARTIFACT))?;
    let depth = ChannelArtifact::from_exr_file(&dir.join(DEPTH_ARTIFACT))?;
    let normal = ChannelArtifact::from_exr_file(&dir.join(NORMAL_ARTIFACT))?;

    let pass = decode_pass(&colour, &depth, &normal)?;
    debug!(
        "Decoded {} pass from {}",
        pass.colour.dimensions(),
        dir.display()
    );
    Ok(pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(width: usize, height: usize, names: &[&str]) -> ChannelArtifact {
        let count = width * height;
        let channels = names
            .iter()
            .enumerate()
            .map(|(i, name)| NamedChannel::new(*name, vec![i as f32; count]))
            .collect();
        ChannelArtifact::new(Dimensions::new(width, height), channels)
    }

    #[test]
    fn depth_prefers_z_over_everything() {
        let artifact = artifact(2, 2, &["A", "B", "Depth", "G", "R", "Z"]);
        assert_eq!(select_depth_channel(&artifact).unwrap().name, "Z");
    }

    #[test]
    fn depth_priority_order_is_preserved() {
        let cases: [(&[&str], &str); 5] = [
            (&["A", "Depth", "R"], "Depth"),
            (&["A", "B", "G", "R"], "R"),
            (&["A", "B", "G"], "G"),
            (&["A", "B"], "B"),
            (&["V", "A"], "A"),
        ];
        for (names, expected) in cases {
            let artifact = artifact(1, 1, names);
            assert_eq!(select_depth_channel(&artifact).unwrap().name, expected);
        }
    }

    #[test]
    fn depth_falls_back_to_first_declared_channel() {
        let artifact = artifact(1, 1, &["distance", "mist"]);
        assert_eq!(select_depth_channel(&artifact).unwrap().name, "distance");
    }

    #[test]
    fn depth_without_channels_is_missing() {
        let artifact = artifact(1, 1, &[]);
        assert!(matches!(
            decode_depth(&artifact),
            Err(DecodeError::MissingChannel {
                group: ChannelGroup::Depth,
                ..
            })
        ));
    }

    #[test]
    fn normal_prefers_xyz_then_rgb() {
        let xyz = artifact(1, 1, &["B", "G", "R", "X", "Y", "Z"]);
        assert_eq!(decode_normal(&xyz).unwrap().as_slice(), &[[3.0, 4.0, 5.0]]);

        let rgb = artifact(1, 1, &["B", "G", "R"]);
        assert_eq!(decode_normal(&rgb).unwrap().as_slice(), &[[2.0, 1.0, 0.0]]);
    }

    #[test]
    fn normal_defaults_to_camera_facing() {
        let artifact = artifact(2, 1, &["Y"]);
        let normal = decode_normal(&artifact).unwrap();
        assert_eq!(normal.as_slice(), &[DEFAULT_NORMAL, DEFAULT_NORMAL]);
    }

    #[test]
    fn pass_flags_default_normal() {
        let colour = artifact(2, 2, &["B", "G", "R"]);
        let depth = artifact(2, 2, &["Z"]);

        let filled = decode_pass(&colour, &depth, &artifact(2, 2, &["V"])).unwrap();
        assert!(filled.normal_is_default);
        assert_eq!(filled.normal.as_slice()[3], DEFAULT_NORMAL);

        let rgb = decode_pass(&colour, &depth, &artifact(2, 2, &["B", "G", "R"])).unwrap();
        assert!(!rgb.normal_is_default);
    }

    #[test]
    fn colour_requires_rgb() {
        let artifact = artifact(1, 1, &["R", "G"]);
        assert!(matches!(
            decode_colour(&artifact),
            Err(DecodeError::MissingChannel {
                group: ChannelGroup::Colour,
                ..
            })
        ));
    }

    #[test]
    fn sample_count_is_checked_against_data_window() {
        let artifact = ChannelArtifact::new(
            Dimensions::new(2, 2),
            vec![NamedChannel::new("Z", vec![1.0; 3])],
        );
        assert!(matches!(
            decode_depth(&artifact),
            Err(DecodeError::SampleCount {
                expected: 4,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn mismatched_shapes_fail_the_pass() {
        let colour = artifact(4, 3, &["B", "G", "R"]);
        let depth = artifact(4, 3, &["Z"]);
        let normal = artifact(3, 4, &["X", "Y", "Z"]);

        match decode_pass(&colour, &depth, &normal) {
            Err(DecodeError::ShapeMismatch {
                group,
                expected,
                found,
            }) => {
                assert_eq!(group, ChannelGroup::Normal);
                assert_eq!(expected, Dimensions::new(4, 3));
                assert_eq!(found, Dimensions::new(3, 4));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn matching_shapes_decode_all_groups() {
        let colour = artifact(2, 2, &["B", "G", "R"]);
        let depth = artifact(2, 2, &["Z"]);
        let normal = artifact(2, 2, &["X", "Y", "Z"]);

        let pass = decode_pass(&colour, &depth, &normal).unwrap();
        assert_eq!(pass.depth.dimensions(), Dimensions::new(2, 2));
        assert_eq!(pass.normal.as_slice()[0], [0.0, 1.0, 2.0]);
        assert_eq!(pass.colour.as_slice()[0], [2.0, 1.0, 0.0]);
    }
}
