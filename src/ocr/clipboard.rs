//! Clipboard sink for recognized text

use crate::utils::{AppError, AppResult};

/// Replaces the clipboard contents with text
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> AppResult<()>;
}

/// The system clipboard through arboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> AppResult<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
        clipboard.set_text(text.to_owned()).map_err(clipboard_error)?;
        tracing::debug!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }
}

fn clipboard_error(error: arboard::Error) -> AppError {
    AppError::Io(std::io::Error::other(format!("Clipboard unavailable: {}", error)))
}
