/// Shape-checked f32 channel buffers for one render pass
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a buffer or artifact data window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by these dimensions
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Row-major H×W grid of samples.
/// `T = f32` is a single-channel buffer (depth), `T = [f32; 3]` a
/// three-channel buffer (normal, colour).
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBuffer<T> {
    dimensions: Dimensions,
    data: Vec<T>,
}

/// Single-channel H×W buffer.
pub type DepthBuffer = ChannelBuffer<f32>;

/// Three-channel H×W×3 buffer.
pub type VectorBuffer = ChannelBuffer<[f32; 3]>;

impl<T: Copy> ChannelBuffer<T> {
    /// Wrap row-major samples, returning `None` when the length does not
    /// match the dimensions.
    pub fn from_vec(dimensions: Dimensions, data: Vec<T>) -> Option<Self> {
        (data.len() == dimensions.pixel_count()).then_some(Self { dimensions, data })
    }

    /// Buffer with every pixel set to `value`
    pub fn filled(dimensions: Dimensions, value: T) -> Self {
        Self {
            dimensions,
            data: vec![value; dimensions.pixel_count()],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> usize {
        self.dimensions.width
    }

    pub fn height(&self) -> usize {
        self.dimensions.height
    }

    /// Sample at column `u`, row `v`
    pub fn get(&self, u: usize, v: usize) -> Option<T> {
        if u >= self.dimensions.width || v >= self.dimensions.height {
            return None;
        }
        self.data.get(v * self.dimensions.width + u).copied()
    }

    /// Flattened row-major samples
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every sample, keeping the shape
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> ChannelBuffer<U> {
        ChannelBuffer {
            dimensions: self.dimensions,
            data: self.data.iter().map(|&sample| f(sample)).collect(),
        }
    }

    /// Apply `f(u, v, sample)` to every pixel in row-major order
    pub fn map_pixels<U: Copy>(&self, f: impl Fn(usize, usize, T) -> U) -> ChannelBuffer<U> {
        let width = self.dimensions.width;
        ChannelBuffer {
            dimensions: self.dimensions,
            data: self
                .data
                .iter()
                .enumerate()
                .map(|(i, &sample)| f(i % width, i / width, sample))
                .collect(),
        }
    }
}

impl VectorBuffer {
    /// Interleave three planar channels into a three-channel buffer.
    /// Returns `None` when any plane length disagrees with the dimensions.
    pub fn from_planes(dimensions: Dimensions, planes: [&[f32]; 3]) -> Option<Self> {
        let count = dimensions.pixel_count();
        if planes.iter().any(|plane| plane.len() != count) {
            return None;
        }

        let data = (0..count)
            .map(|i| [planes[0][i], planes[1][i], planes[2][i]])
            .collect();
        Some(Self { dimensions, data })
    }
}
