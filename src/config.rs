//! Runtime settings
//!
//! Fixed recording parameters plus the handful of external tools and paths
//! that can be overridden through the environment.

use crate::export::types::VideoQuality;
use std::path::PathBuf;

/// Capture rate for recordings, in frames per second
pub const FRAME_RATE: u32 = 10;

/// Recorded frames are downscaled so the longer side is this share of the original
pub const DOWNSCALE_FACTOR: f32 = 0.7;

pub const ENV_FFMPEG: &str = "MACOSREC_FFMPEG";
pub const ENV_FFPROBE: &str = "MACOSREC_FFPROBE";
pub const ENV_TESSERACT: &str = "MACOSREC_TESSERACT";
pub const ENV_OCR_LANG: &str = "MACOSREC_OCR_LANG";
pub const ENV_OUTPUT_DIR: &str = "MACOSREC_OUTPUT_DIR";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Frames per second while recording
    pub fps: u32,

    /// Downscale factor applied to every recorded frame
    pub downscale: f32,

    /// Video quality for `.mov` recordings
    pub quality: VideoQuality,

    /// ffmpeg executable
    pub ffmpeg: String,

    /// ffprobe executable
    pub ffprobe: String,

    /// tesseract executable
    pub tesseract: String,

    /// Languages passed to the OCR engine (engine default when unset)
    pub ocr_languages: Option<String>,

    /// Directory for generated output names
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: FRAME_RATE,
            downscale: DOWNSCALE_FACTOR,
            quality: VideoQuality::High,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            tesseract: "tesseract".to_string(),
            ocr_languages: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Settings {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Self::default();

        if let Some(ffmpeg) = non_empty(ENV_FFMPEG) {
            settings.ffmpeg = ffmpeg;
        }
        if let Some(ffprobe) = non_empty(ENV_FFPROBE) {
            settings.ffprobe = ffprobe;
        }
        if let Some(tesseract) = non_empty(ENV_TESSERACT) {
            settings.tesseract = tesseract;
        }
        settings.ocr_languages = non_empty(ENV_OCR_LANG);
        if let Some(dir) = non_empty(ENV_OUTPUT_DIR) {
            settings.output_dir = PathBuf::from(dir);
        }

        settings
    }
}

fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
