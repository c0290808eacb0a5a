//! `--screenshot`

use super::{target_window, Backends};
use crate::export::{export_frames, ExportOptions, MediaKind};
use crate::utils::paths::{default_output_path, ensure_parent_dir};
use crate::utils::{AppError, AppResult};
use chrono::Local;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Capture one window to PNG and print the written path
pub async fn take(
    backends: &Backends,
    window: &str,
    output: Option<PathBuf>,
    out: &mut dyn Write,
) -> AppResult<u8> {
    let target = target_window(backends, window)?;

    let frames = Arc::clone(&backends.frames);
    let id = target.id;
    let frame = tokio::task::spawn_blocking(move || frames.capture_window_image(id))
        .await
        .map_err(|e| AppError::CaptureFailure(format!("Capture task failed: {}", e)))?
        .ok_or_else(|| {
            AppError::InvalidWindowReference(format!("Window {} could not be captured", id))
        })?;

    let output = output.unwrap_or_else(|| {
        default_output_path(
            &backends.settings.output_dir,
            &target.app_name,
            MediaKind::Still.extension(),
            Local::now(),
        )
    });
    ensure_parent_dir(&output)?;

    tracing::info!(
        "Screenshot of window {} ({}x{}) to {:?}",
        target.id,
        frame.width(),
        frame.height(),
        output
    );

    let options = ExportOptions::new(MediaKind::Still, output.clone(), &backends.settings);
    tokio::task::spawn_blocking(move || export_frames(vec![frame], &options))
        .await
        .map_err(|e| AppError::CaptureFailure(format!("Screenshot task failed: {}", e)))??;

    writeln!(out, "{}", output.display())?;
    Ok(0)
}
