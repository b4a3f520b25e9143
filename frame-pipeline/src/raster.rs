/// 8-bit PNG export of floating-point channel buffers.
use crate::buffer::ChannelBuffer;
use crate::error::EncodeError;
use constants::render_settings::QUANTIZATION_SCALE;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::path::Path;

/// Clip to [0, 1] and scale to a byte with a truncating cast.
/// `0.5 → 127`, `0.8 → 204`; NaN maps to 0.
pub fn quantize(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * QUANTIZATION_SCALE) as u8
}

/// Sample types a raster can be built from.
/// The PNG channel count follows the buffer's rank.
pub trait RasterSample: Copy {
    const COLOR_TYPE: ColorType;

    fn push_quantized(self, out: &mut Vec<u8>);
}

impl RasterSample for f32 {
    const COLOR_TYPE: ColorType = ColorType::L8;

    fn push_quantized(self, out: &mut Vec<u8>) {
        out.push(quantize(self));
    }
}

impl RasterSample for [f32; 3] {
    const COLOR_TYPE: ColorType = ColorType::Rgb8;

    fn push_quantized(self, out: &mut Vec<u8>) {
        out.extend(self.map(quantize));
    }
}

/// Quantized row-major pixel bytes of `buffer`
pub fn quantize_buffer<T: RasterSample>(buffer: &ChannelBuffer<T>) -> Vec<u8> {
    let channels = T::COLOR_TYPE.channel_count() as usize;
    let mut pixels = Vec::with_capacity(buffer.as_slice().len() * channels);
    for &sample in buffer.as_slice() {
        sample.push_quantized(&mut pixels);
    }
    pixels
}

/// Encode a buffer as an 8-bit PNG: grayscale for H×W, RGB for H×W×3.
pub fn encode_png<T: RasterSample>(buffer: &ChannelBuffer<T>) -> Result<Vec<u8>, EncodeError> {
    let pixels = quantize_buffer(buffer);

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &pixels,
        buffer.width() as u32,
        buffer.height() as u32,
        T::COLOR_TYPE,
    )?;
    Ok(bytes)
}

/// Encode `buffer` and write the PNG to `path`.
pub fn save_png<T: RasterSample>(buffer: &ChannelBuffer<T>, path: &Path) -> Result<(), EncodeError> {
    std::fs::write(path, encode_png(buffer)?)?;
    Ok(())
}
