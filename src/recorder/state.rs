//! Recording state management
//!
//! Defines the session state machine, its configuration and outcome.

use crate::capture::WindowDescriptor;
use crate::config::Settings;
use crate::export::{ExportOptions, MediaKind, VideoQuality};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Lifecycle of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not started
    #[default]
    Idle,
    /// Timer running, frames being buffered
    Capturing,
    /// Timer stopped, buffer being encoded or discarded
    Finalizing,
    /// Finished
    Done,
}

impl SessionState {
    /// Allowed transitions. Capturing never returns to Idle.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Idle, SessionState::Capturing)
                | (SessionState::Capturing, SessionState::Finalizing)
                | (SessionState::Finalizing, SessionState::Done)
        )
    }
}

/// Configuration for starting a recording
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Window to record
    pub target: WindowDescriptor,

    /// Animated image or video
    pub media_kind: MediaKind,

    /// Where the finished recording goes
    pub output: PathBuf,

    /// Captures per second
    pub fps: u32,

    /// Downscale factor applied to every frame
    pub downscale: f32,

    /// Video quality (video only)
    pub quality: VideoQuality,

    /// ffmpeg executable (video only)
    pub ffmpeg: String,
}

impl RecordingConfig {
    pub fn new(target: WindowDescriptor, media_kind: MediaKind, output: PathBuf, settings: &Settings) -> Self {
        Self {
            target,
            media_kind,
            output,
            fps: settings.fps.max(1),
            downscale: settings.downscale,
            quality: settings.quality,
            ffmpeg: settings.ffmpeg.clone(),
        }
    }

    /// Time between captures
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.fps.max(1) as u64)
    }

    /// Encoder options for the finished buffer
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            kind: self.media_kind,
            output_path: self.output.clone(),
            fps: self.fps,
            quality: self.quality,
            ffmpeg: self.ffmpeg.clone(),
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingOutcome {
    /// Frames were encoded and written
    Saved {
        path: PathBuf,
        frames: u64,
    },
    /// Frames were discarded
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_only() {
        use SessionState::*;
        assert!(Idle.can_transition_to(Capturing));
        assert!(Capturing.can_transition_to(Finalizing));
        assert!(Finalizing.can_transition_to(Done));

        assert!(!Capturing.can_transition_to(Idle));
        assert!(!Idle.can_transition_to(Finalizing));
        assert!(!Done.can_transition_to(Capturing));
    }

    #[test]
    fn test_default_interval_is_100ms() {
        let target = WindowDescriptor {
            id: 1,
            app_name: "Emacs".to_string(),
            title: String::new(),
        };
        let config = RecordingConfig::new(
            target,
            MediaKind::Animated,
            PathBuf::from("out.gif"),
            &Settings::default(),
        );
        assert_eq!(config.frame_interval(), Duration::from_millis(100));
        assert_eq!(config.export_options().frame_delay_ms(), 100);
    }
}
