//! Per-frame downscale applied while recording

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};

/// Maximum JPEG quality for the intermediate transcode
const TRANSCODE_QUALITY: u8 = 100;

/// Target size after scaling both sides by `factor`, never below 1px
pub fn scaled_dimensions(width: u32, height: u32, factor: f32) -> (u32, u32) {
    let scale = |side: u32| ((side as f32 * factor).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Shrink a frame so its longer side is `factor` of the original.
///
/// The frame passes through a maximum-quality JPEG round trip first, so the
/// result is always opaque.
pub fn downscale(frame: RgbaImage, factor: f32) -> Result<RgbaImage, ImageError> {
    let (width, height) = scaled_dimensions(frame.width(), frame.height(), factor);

    let mut jpeg = Vec::new();
    DynamicImage::ImageRgba8(frame)
        .to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, TRANSCODE_QUALITY))?;

    let transcoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)?;
    Ok(transcoded
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgba8())
}
