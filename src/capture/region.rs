//! Interactive region capture
//!
//! Delegates to the OS screenshot utility in selection mode and hands back the
//! written image file.

use crate::utils::{AppError, AppResult};
use std::path::Path;
use std::process::Command;

/// Lets the user select a screen region and saves it as an image
pub trait RegionSelector: Send + Sync {
    /// Write the selected region to `dest` as PNG
    fn select_region(&self, dest: &Path) -> AppResult<()>;
}

/// `screencapture -i` on macOS
#[derive(Debug, Clone)]
pub struct InteractiveScreenshot {
    program: String,
}

impl Default for InteractiveScreenshot {
    fn default() -> Self {
        Self {
            program: "screencapture".to_string(),
        }
    }
}

impl InteractiveScreenshot {
    pub fn new() -> Self {
        Self::default()
    }

    fn args(dest: &Path) -> Vec<String> {
        vec![
            // interactive selection, no shutter sound
            "-i".to_string(),
            "-x".to_string(),
            dest.to_string_lossy().to_string(),
        ]
    }
}

impl RegionSelector for InteractiveScreenshot {
    fn select_region(&self, dest: &Path) -> AppResult<()> {
        if !cfg!(target_os = "macos") {
            return Err(AppError::CaptureFailure(
                "Interactive region capture is only available on macOS; pass --input <image>"
                    .to_string(),
            ));
        }

        let args = Self::args(dest);
        tracing::debug!("Running {} {:?}", self.program, args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| AppError::CaptureFailure(format!("Failed to run {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(AppError::CaptureFailure(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        ensure_region_written(dest)
    }
}

/// Cancelling the selection exits successfully but leaves no image behind
fn ensure_region_written(dest: &Path) -> AppResult<()> {
    match std::fs::metadata(dest) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(AppError::CaptureFailure("No region was selected".to_string())),
    }
}
