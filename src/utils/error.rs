//! Error types and handling
//!
//! The user-facing error taxonomy. Every variant is terminal: the binary prints
//! it once as `Error: <message>` and exits with status 1.

use crate::export::types::EncodeError;
use crate::ocr::RecognitionError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid window reference: {0}")]
    InvalidWindowReference(String),

    #[error("Capture failed: {0}")]
    CaptureFailure(String),

    #[error("Encoding failed: {0}")]
    Encode(EncodeError),

    #[error("No frames were captured")]
    NoFrames,

    #[error("Text recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("{0}")]
    Coordination(String),
}

impl AppError {
    /// Stable tag for the error kind, used in log records
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::InvalidWindowReference(_) => "INVALID_WINDOW_REFERENCE",
            AppError::CaptureFailure(_) => "CAPTURE_FAILURE",
            AppError::Encode(_) => "ENCODE_ERROR",
            AppError::NoFrames => "NO_FRAMES",
            AppError::Recognition(_) => "RECOGNITION_ERROR",
            AppError::Coordination(_) => "COORDINATION_FAILURE",
        }
    }
}

impl From<EncodeError> for AppError {
    fn from(error: EncodeError) -> Self {
        match error {
            EncodeError::NoFrames => AppError::NoFrames,
            other => AppError::Encode(other),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frames_encode_error_maps_to_no_frames() {
        let error: AppError = EncodeError::NoFrames.into();
        assert!(matches!(error, AppError::NoFrames));
        assert_eq!(error.code(), "NO_FRAMES");
    }

    #[test]
    fn test_ffmpeg_error_stays_an_encode_error() {
        let error: AppError = EncodeError::Ffmpeg("exited with 1".to_string()).into();
        assert_eq!(error.code(), "ENCODE_ERROR");
        assert!(error.to_string().contains("exited with 1"));
    }
}
