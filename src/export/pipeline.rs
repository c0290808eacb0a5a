//! Export pipeline
//!
//! Routes a drained frame buffer to the encoder matching the media kind.

use super::ffmpeg::encode_video;
use super::gif::write_animated;
use super::still::write_still;
use super::types::{EncodeError, MediaKind, VideoQuality};
use crate::config::Settings;
use image::RgbaImage;
use std::path::PathBuf;

/// Export configuration options
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Output kind
    pub kind: MediaKind,
    /// Output file path
    pub output_path: PathBuf,
    /// Frames per second the buffer was captured at
    pub fps: u32,
    /// Video quality (video only)
    pub quality: VideoQuality,
    /// ffmpeg executable (video only)
    pub ffmpeg: String,
}

impl ExportOptions {
    pub fn new(kind: MediaKind, output_path: PathBuf, settings: &Settings) -> Self {
        Self {
            kind,
            output_path,
            fps: settings.fps,
            quality: settings.quality,
            ffmpeg: settings.ffmpeg.clone(),
        }
    }

    /// Per-frame delay matching the capture interval
    pub fn frame_delay_ms(&self) -> u32 {
        1000 / self.fps.max(1)
    }
}

/// Encode `frames` (in capture order) and write the result.
///
/// Returns the number of frames that made it into the output.
pub fn export_frames(frames: Vec<RgbaImage>, options: &ExportOptions) -> Result<u64, EncodeError> {
    if frames.is_empty() {
        return Err(EncodeError::NoFrames);
    }

    tracing::info!(
        "Exporting {} frames as {:?} to {:?}",
        frames.len(),
        options.kind,
        options.output_path
    );

    match options.kind {
        MediaKind::Still => {
            // A still export keeps the most recent frame
            let last = frames.last().ok_or(EncodeError::NoFrames)?;
            write_still(last, &options.output_path)?;
            Ok(1)
        }
        MediaKind::Animated => {
            write_animated(frames, options.frame_delay_ms(), &options.output_path)
        }
        MediaKind::Video => encode_video(
            &options.ffmpeg,
            frames,
            options.fps,
            options.quality,
            &options.output_path,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn options(kind: MediaKind, output_path: PathBuf) -> ExportOptions {
        ExportOptions::new(kind, output_path, &Settings::default())
    }

    #[test]
    fn test_delay_follows_fps() {
        let opts = options(MediaKind::Animated, PathBuf::from("a.gif"));
        assert_eq!(opts.frame_delay_ms(), 100);
    }

    #[test]
    fn test_no_frames_for_any_kind() {
        let dir = tempdir().unwrap();
        for kind in [MediaKind::Still, MediaKind::Animated, MediaKind::Video] {
            let path = dir.path().join(format!("out.{}", kind.extension()));
            let result = export_frames(Vec::new(), &options(kind, path.clone()));
            assert!(matches!(result, Err(EncodeError::NoFrames)));
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_animated_export_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out.gif");
        let frames = vec![RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])); 2];

        let written = export_frames(frames, &options(MediaKind::Animated, path.clone())).unwrap();
        assert_eq!(written, 2);
        assert!(path.is_file());
    }

    #[test]
    fn test_animated_export_counts_only_matching_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resized.gif");
        let frames = vec![
            RgbaImage::new(10, 10),
            RgbaImage::new(14, 14),
            RgbaImage::new(10, 10),
        ];

        let written = export_frames(frames, &options(MediaKind::Animated, path.clone())).unwrap();
        assert_eq!(written, 2);
    }
}
