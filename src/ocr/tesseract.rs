//! Tesseract OCR wrapper.
//!
//! Runs the `tesseract` CLI in TSV mode and folds word rows into one region
//! per text line.

use super::{OcrResult, RecognitionError, RecognizedText, TextRecognizer};
use std::path::Path;
use std::process::Command;

/// TSV row level for a single word
const WORD_LEVEL: &str = "5";

#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: String,
    languages: Option<String>,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<String>, languages: Option<String>) -> Self {
        Self {
            program: program.into(),
            languages,
        }
    }

    fn args(&self, image: &Path) -> Vec<String> {
        let mut args = vec![image.to_string_lossy().to_string(), "stdout".to_string()];
        if let Some(languages) = &self.languages {
            args.push("-l".to_string());
            args.push(languages.clone());
        }
        args.push("tsv".to_string());
        args
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize_text(&self, image: &Path) -> Result<OcrResult, RecognitionError> {
        // Fail early with a decode error instead of an opaque engine message
        let (width, height) = image::image_dimensions(image)
            .map_err(|e| RecognitionError::Decode(format!("{:?}: {}", image, e)))?;

        let args = self.args(image);
        tracing::debug!("Running {} {:?} on {}x{} image", self.program, args, width, height);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| RecognitionError::Engine(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Engine(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let regions = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        tracing::info!("Recognized {} text regions", regions.len());
        Ok(regions)
    }
}

/// Accumulates the words of one line
struct LineGroup {
    key: (String, String, String, String),
    words: Vec<String>,
    confidence_sum: f32,
}

/// Group word rows by (page, block, paragraph, line), keeping first-seen order
fn parse_tsv(tsv: &str) -> Result<OcrResult, RecognitionError> {
    let mut lines = tsv.lines();
    let header = lines
        .next()
        .ok_or_else(|| RecognitionError::Parse("empty TSV output".to_string()))?;
    if !header.starts_with("level") {
        return Err(RecognitionError::Parse(format!("missing TSV header: {}", header)));
    }

    let mut groups: Vec<LineGroup> = Vec::new();
    for row in lines {
        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < 12 || columns[0] != WORD_LEVEL {
            continue;
        }

        let text = columns[11..].join("\t").trim().to_string();
        if text.is_empty() {
            continue;
        }
        let confidence: f32 = columns[10].trim().parse().unwrap_or(0.0);
        let key = (
            columns[1].to_string(),
            columns[2].to_string(),
            columns[3].to_string(),
            columns[4].to_string(),
        );

        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => {
                group.words.push(text);
                group.confidence_sum += confidence;
            }
            None => groups.push(LineGroup {
                key,
                words: vec![text],
                confidence_sum: confidence,
            }),
        }
    }

    Ok(groups
        .into_iter()
        .map(|group| RecognizedText {
            confidence: group.confidence_sum / group.words.len() as f32,
            text: group.words.join(" "),
        })
        .collect())
}
