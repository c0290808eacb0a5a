//! `--ocr`

use super::Backends;
use crate::cli::OcrSink;
use crate::ocr::texts;
use crate::utils::paths::ensure_parent_dir;
use crate::utils::{AppError, AppResult};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Recognize text in `input`, or in an interactively selected region when no
/// input is given, and hand the strings to `sink`
pub async fn recognize(
    backends: &Backends,
    input: Option<PathBuf>,
    sink: OcrSink,
    out: &mut dyn Write,
) -> AppResult<u8> {
    // Keeps the selected region alive until recognition is done
    let scratch = tempfile::tempdir()?;

    let image = match input {
        Some(path) => path,
        None => {
            let dest = scratch.path().join("region.png");
            let regions = Arc::clone(&backends.regions);
            let selected = dest.clone();
            tokio::task::spawn_blocking(move || regions.select_region(&selected))
                .await
                .map_err(|e| AppError::CaptureFailure(format!("Region selection task failed: {}", e)))??;
            dest
        }
    };

    let recognizer = Arc::clone(&backends.recognizer);
    let result = tokio::task::spawn_blocking(move || recognizer.recognize_text(&image))
        .await
        .map_err(|e| AppError::CaptureFailure(format!("Recognition task failed: {}", e)))??;
    let lines = texts(&result);
    tracing::info!("Recognized {} text regions", lines.len());

    match sink {
        OcrSink::Stdout => {
            for line in &lines {
                writeln!(out, "{}", line)?;
            }
        }
        OcrSink::File(path) => {
            ensure_parent_dir(&path)?;
            std::fs::write(&path, joined(&lines))?;
            tracing::info!("Wrote recognized text to {:?}", path);
        }
        OcrSink::Clipboard => backends.clipboard.set_text(&lines.join("\n"))?,
    }

    Ok(0)
}

/// One region per line
fn joined(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined() {
        assert_eq!(joined(&[]), "");
        assert_eq!(joined(&["a".to_string(), "b c".to_string()]), "a\nb c\n");
    }
}
