//! Command-line surface
//!
//! Flags are parsed with clap and then folded into a single [`Intent`].
//! Conflicting combinations are reported as `InvalidArgument`.

use crate::export::{MediaKind, VideoQuality};
use crate::utils::paths::{extension_of, has_extension};
use crate::utils::{AppError, AppResult};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    name = "macosrec",
    about = "Take screenshots, record windows and recognize on-screen text",
    disable_version_flag = true
)]
pub struct Cli {
    /// List capturable windows
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Include hidden windows in --list
    #[arg(short = 'H', long)]
    pub hidden: bool,

    /// Print --list as JSON
    #[arg(long)]
    pub json: bool,

    /// Take a screenshot of an app name or window id
    #[arg(short = 's', long, value_name = "APP_OR_ID")]
    pub screenshot: Option<String>,

    /// Record an app name or window id
    #[arg(short = 'r', long, value_name = "APP_OR_ID")]
    pub record: Option<String>,

    /// Record as .mov
    #[arg(short = 'm', long)]
    pub mov: bool,

    /// Record as .gif
    #[arg(short = 'g', long)]
    pub gif: bool,

    /// Video quality for .mov recordings
    #[arg(short = 'q', long, value_enum)]
    pub quality: Option<VideoQuality>,

    /// Stop the running recording and save it
    #[arg(short = 'x', long)]
    pub save: bool,

    /// Stop the running recording and discard it
    #[arg(short = 'a', long)]
    pub abort: bool,

    /// Recognize text in a selected screen region
    #[arg(short = 'c', long)]
    pub ocr: bool,

    /// Copy recognized text to the clipboard
    #[arg(short = 'b', long)]
    pub clipboard: bool,

    /// Image to run --ocr on instead of a screen selection
    #[arg(short = 'i', long, value_name = "IMAGE")]
    pub input: Option<PathBuf>,

    /// Output file
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long)]
    pub version: bool,
}

/// Where recognized text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrSink {
    Stdout,
    File(PathBuf),
    Clipboard,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    List {
        hidden: bool,
        json: bool,
    },
    Screenshot {
        window: String,
        output: Option<PathBuf>,
    },
    Record {
        window: String,
        kind: MediaKind,
        output: Option<PathBuf>,
        quality: Option<VideoQuality>,
    },
    Save,
    Abort,
    Ocr {
        input: Option<PathBuf>,
        sink: OcrSink,
    },
    Version,
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::InvalidArgument(message.into())
}

/// Pick the recording kind: explicit flag, then output extension, then `.mov`.
/// A flag that contradicts the extension is rejected.
pub fn resolve_media_kind(mov: bool, gif: bool, output: Option<&PathBuf>) -> AppResult<MediaKind> {
    let flagged = match (mov, gif) {
        (true, true) => return Err(invalid("--mov and --gif cannot be combined")),
        (true, false) => Some(MediaKind::Video),
        (false, true) => Some(MediaKind::Animated),
        (false, false) => None,
    };

    let from_extension = match output {
        Some(path) => {
            let extension = extension_of(path).unwrap_or_default();
            Some(MediaKind::for_recording_extension(&extension).ok_or_else(|| {
                invalid(format!("Output file must end with .mov or .gif: {}", path.display()))
            })?)
        }
        None => None,
    };

    match (flagged, from_extension) {
        (Some(flag), Some(ext)) if flag != ext => Err(invalid(format!(
            "--{} is not compatible with .{} output",
            flag.extension(),
            ext.extension()
        ))),
        (Some(flag), _) => Ok(flag),
        (None, Some(ext)) => Ok(ext),
        (None, None) => Ok(MediaKind::Video),
    }
}

impl Cli {
    /// Validate flag combinations and produce the single requested action
    pub fn intent(&self) -> AppResult<Intent> {
        let actions = [
            ("--list", self.list),
            ("--screenshot", self.screenshot.is_some()),
            ("--record", self.record.is_some()),
            ("--save", self.save),
            ("--abort", self.abort),
            ("--ocr", self.ocr),
            ("--version", self.version),
        ];
        let chosen: Vec<&str> = actions
            .iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| *name)
            .collect();

        match chosen.len() {
            0 => return Err(invalid("No action given, see --help")),
            1 => {}
            _ => return Err(invalid(format!("{} cannot be combined", chosen.join(", ")))),
        }

        if (self.hidden || self.json) && !self.list {
            return Err(invalid("--hidden and --json only apply to --list"));
        }
        if (self.mov || self.gif || self.quality.is_some()) && self.record.is_none() {
            return Err(invalid("--mov, --gif and --quality only apply to --record"));
        }
        if (self.clipboard || self.input.is_some()) && !self.ocr {
            return Err(invalid("--clipboard and --input only apply to --ocr"));
        }

        if self.list {
            self.reject_output("--list")?;
            return Ok(Intent::List {
                hidden: self.hidden,
                json: self.json,
            });
        }

        if let Some(window) = &self.screenshot {
            if let Some(output) = &self.output {
                if !has_extension(output, "png") {
                    return Err(invalid(format!(
                        "Screenshot output must end with .png: {}",
                        output.display()
                    )));
                }
            }
            return Ok(Intent::Screenshot {
                window: window.clone(),
                output: self.output.clone(),
            });
        }

        if let Some(window) = &self.record {
            let kind = resolve_media_kind(self.mov, self.gif, self.output.as_ref())?;
            return Ok(Intent::Record {
                window: window.clone(),
                kind,
                output: self.output.clone(),
                quality: self.quality,
            });
        }

        if self.ocr {
            let sink = match (&self.output, self.clipboard) {
                (Some(_), true) => return Err(invalid("--clipboard and --output cannot be combined")),
                (Some(output), false) => {
                    if !has_extension(output, "txt") {
                        return Err(invalid(format!(
                            "OCR output must end with .txt: {}",
                            output.display()
                        )));
                    }
                    OcrSink::File(output.clone())
                }
                (None, true) => OcrSink::Clipboard,
                (None, false) => OcrSink::Stdout,
            };
            return Ok(Intent::Ocr {
                input: self.input.clone(),
                sink,
            });
        }

        if self.save {
            self.reject_output("--save")?;
            return Ok(Intent::Save);
        }
        if self.abort {
            self.reject_output("--abort")?;
            return Ok(Intent::Abort);
        }

        self.reject_output("--version")?;
        Ok(Intent::Version)
    }

    fn reject_output(&self, action: &str) -> AppResult<()> {
        if self.output.is_some() {
            return Err(invalid(format!("--output does not apply to {}", action)));
        }
        Ok(())
    }
}
