//! In-memory frame buffer

use image::RgbaImage;

/// Frames in capture order.
///
/// Append-only while recording; drained exactly once, consuming the buffer.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<RgbaImage>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: RgbaImage) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Hand every frame over, oldest first
    pub fn drain(self) -> Vec<RgbaImage> {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_drain_keeps_capture_order() {
        let mut buffer = FrameBuffer::new();
        for shade in [10u8, 20, 30] {
            buffer.push(RgbaImage::from_pixel(1, 1, Rgba([shade, 0, 0, 255])));
        }
        assert_eq!(buffer.len(), 3);

        let shades: Vec<u8> = buffer.drain().iter().map(|f| f.get_pixel(0, 0)[0]).collect();
        assert_eq!(shades, vec![10, 20, 30]);
    }
}
