//! Animated-image encoding (looping GIF)

use super::types::EncodeError;
use crate::utils::paths::ensure_parent_dir;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::path::Path;

/// Quantizer speed, 1 (best) to 30 (fastest)
const GIF_SPEED: i32 = 10;

/// Encoded animation and the number of frames it holds
#[derive(Debug, Clone)]
pub struct AnimatedGif {
    pub bytes: Vec<u8>,
    pub frame_count: u64,
}

/// Encode frames into a looping GIF, in the order given, each shown for `delay_ms`.
///
/// The canvas takes the size of the first frame. Frames of any other size are
/// skipped with a warning, matching the video encoder.
pub fn encode_animated(frames: Vec<RgbaImage>, delay_ms: u32) -> Result<AnimatedGif, EncodeError> {
    let (width, height) = frames
        .first()
        .map(|frame| frame.dimensions())
        .ok_or(EncodeError::NoFrames)?;

    let mut bytes = Vec::new();
    let mut frame_count = 0u64;
    let mut skipped = 0u64;
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;

        for (index, frame) in frames.into_iter().enumerate() {
            if frame.dimensions() != (width, height) {
                tracing::warn!(
                    "Skipping frame {} of {}x{}, animation is {}x{}",
                    index,
                    frame.width(),
                    frame.height(),
                    width,
                    height
                );
                skipped += 1;
                continue;
            }

            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            encoder
                .encode_frame(Frame::from_parts(frame, 0, 0, delay))
                .map_err(|e| EncodeError::Encoding(format!("Failed to add frame {}: {}", index, e)))?;
            frame_count += 1;
        }
        // Dropping the encoder writes the trailer
    }

    tracing::debug!(
        "Encoded {} GIF frames, {} skipped ({} bytes)",
        frame_count,
        skipped,
        bytes.len()
    );
    Ok(AnimatedGif { bytes, frame_count })
}

/// Encode frames and write the GIF to `path`. Returns the number of frames written.
///
/// The file is only created once the whole animation encoded successfully.
pub fn write_animated(frames: Vec<RgbaImage>, delay_ms: u32, path: &Path) -> Result<u64, EncodeError> {
    let gif = encode_animated(frames, delay_ms)?;
    ensure_parent_dir(path)?;
    std::fs::write(path, &gif.bytes)?;

    tracing::info!("Wrote GIF to {:?} ({} bytes)", path, gif.bytes.len());
    Ok(gif.frame_count)
}
