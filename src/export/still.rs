//! Still-image encoding (PNG)

use super::types::EncodeError;
use crate::utils::paths::ensure_parent_dir;
use image::RgbaImage;
use std::path::Path;

/// Encode one frame as a lossless RGBA PNG
pub fn encode_still(frame: &RgbaImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::Encoding(format!(
            "Cannot encode a {}x{} image",
            width, height
        )));
    }

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(frame.as_raw())?;
        writer.finish()?;
    }

    Ok(bytes)
}

/// Encode a frame and write it to `path`
pub fn write_still(frame: &RgbaImage, path: &Path) -> Result<(), EncodeError> {
    let bytes = encode_still(frame)?;
    ensure_parent_dir(path)?;
    std::fs::write(path, &bytes)?;

    tracing::info!(
        "Wrote {}x{} PNG to {:?} ({} bytes)",
        frame.width(),
        frame.height(),
        path,
        bytes.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_still_decodes_to_same_pixels() {
        let mut frame = RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 255]));
        frame.put_pixel(3, 4, Rgba([200, 0, 0, 128]));

        let bytes = encode_still(&frame).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let frame = RgbaImage::new(0, 0);
        assert!(matches!(encode_still(&frame), Err(EncodeError::Encoding(_))));
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempdir().unwrap();
        // A directory cannot be overwritten by a file
        let result = write_still(&RgbaImage::new(2, 2), dir.path());
        assert!(matches!(result, Err(EncodeError::Io(_))));
    }
}
