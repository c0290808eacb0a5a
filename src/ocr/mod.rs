//! Text recognition
//!
//! A recognizer turns one image into an ordered list of text regions, one
//! string per region (the engine's top candidate).

mod clipboard;
mod tesseract;

pub use clipboard::{ClipboardSink, SystemClipboard};
pub use tesseract::TesseractRecognizer;

use std::path::Path;
use thiserror::Error;

/// One recognized region
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    /// Top-ranked candidate for the region
    pub text: String,

    /// Engine confidence, 0-100
    pub confidence: f32,
}

/// Recognized regions in reading order
pub type OcrResult = Vec<RecognizedText>;

/// Runs OCR over a single image file
pub trait TextRecognizer: Send + Sync {
    fn recognize_text(&self, image: &Path) -> Result<OcrResult, RecognitionError>;
}

/// Only the strings, in order
pub fn texts(result: &OcrResult) -> Vec<String> {
    result.iter().map(|region| region.text.clone()).collect()
}

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("Unexpected OCR output: {0}")]
    Parse(String),
}
