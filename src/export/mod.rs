//! Media export
//!
//! Encoders for still images (PNG), looping animations (GIF) and video
//! (H.264 `.mov` through FFmpeg).

pub mod ffmpeg;
pub mod gif;
pub mod pipeline;
pub mod still;
pub mod types;

pub use pipeline::{export_frames, ExportOptions};
pub use types::{EncodeError, MediaKind, VideoQuality};
