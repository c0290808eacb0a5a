//! Encoder types
//!
//! Media kinds, video quality presets and the encoder error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Lossless still image
    Still,
    /// Looping animated image
    Animated,
    /// Compressed video
    Video,
}

impl MediaKind {
    /// Get the file extension for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Still => "png",
            MediaKind::Animated => "gif",
            MediaKind::Video => "mov",
        }
    }

    /// Recording kind for a file extension
    pub fn for_recording_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "gif" => Some(MediaKind::Animated),
            "mov" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// Video quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Low,
    Medium,
    High,
    Lossless,
}

impl VideoQuality {
    /// Get the CRF value for H.264 encoding
    /// Lower values = higher quality, larger files
    pub fn crf(&self) -> u8 {
        match self {
            VideoQuality::Low => 28,
            VideoQuality::Medium => 23,
            VideoQuality::High => 18,
            // CRF 0 is not playable in most players once converted to yuv420p
            VideoQuality::Lossless => 1,
        }
    }

    /// Get the FFmpeg preset for H.264 encoding
    pub fn h264_preset(&self) -> &'static str {
        match self {
            VideoQuality::Low => "faster",
            VideoQuality::Medium => "medium",
            VideoQuality::High => "slow",
            VideoQuality::Lossless => "veryslow",
        }
    }
}

/// Encoder errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("No frames to encode")]
    NoFrames,
}
