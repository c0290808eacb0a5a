//! Command handlers
//!
//! One handler per [`Intent`]. Handlers write their user-facing output to the
//! writer they are given and return the process exit status.

pub mod ocr;
pub mod recording;
pub mod screenshot;
pub mod system;
pub mod windows;

use crate::capture::region::InteractiveScreenshot;
use crate::capture::{
    describe_window, resolve_identifier, FrameSource, RegionSelector, SystemWindows,
    WindowDescriptor, WindowEnumerator,
};
use crate::cli::Intent;
use crate::config::Settings;
use crate::ocr::{ClipboardSink, SystemClipboard, TesseractRecognizer, TextRecognizer};
use crate::process::{ControlSignal, InstanceCoordinator, ProcessCoordinator};
use crate::utils::AppResult;
use std::io::Write;
use std::sync::Arc;

/// Everything a command talks to outside the process
#[derive(Clone)]
pub struct Backends {
    pub windows: Arc<dyn WindowEnumerator>,
    pub frames: Arc<dyn FrameSource>,
    pub regions: Arc<dyn RegionSelector>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub clipboard: Arc<dyn ClipboardSink>,
    pub coordinator: Arc<dyn InstanceCoordinator>,
    pub settings: Settings,
}

impl Backends {
    /// Real window server, tesseract, clipboard and `ps`
    pub fn system(settings: Settings) -> Self {
        let windows = Arc::new(SystemWindows::new());
        Self {
            windows: windows.clone(),
            frames: windows,
            regions: Arc::new(InteractiveScreenshot::new()),
            recognizer: Arc::new(TesseractRecognizer::new(
                settings.tesseract.clone(),
                settings.ocr_languages.clone(),
            )),
            clipboard: Arc::new(SystemClipboard),
            coordinator: Arc::new(ProcessCoordinator::default()),
            settings,
        }
    }
}

/// Run one intent to completion
pub async fn execute(intent: Intent, backends: &Backends, out: &mut dyn Write) -> AppResult<u8> {
    tracing::debug!("Executing {:?}", intent);

    match intent {
        Intent::List { hidden, json } => windows::list(backends, hidden, json, out),
        Intent::Screenshot { window, output } => {
            screenshot::take(backends, &window, output, out).await
        }
        Intent::Record {
            window,
            kind,
            output,
            quality,
        } => {
            let request = recording::RecordRequest {
                window,
                kind,
                output,
                quality,
            };
            recording::record(backends, request, out, recording::install_signal_listener).await
        }
        Intent::Save => recording::signal_running(backends, ControlSignal::Save),
        Intent::Abort => recording::signal_running(backends, ControlSignal::Abort),
        Intent::Ocr { input, sink } => ocr::recognize(backends, input, sink, out).await,
        Intent::Version => system::version(out),
    }
}

/// Resolve `input` and look up its descriptor.
///
/// A numeric id the enumerator does not know about is still accepted and
/// named after the id; capture decides whether it exists.
pub(crate) fn target_window(backends: &Backends, input: &str) -> AppResult<WindowDescriptor> {
    let id = resolve_identifier(backends.windows.as_ref(), input)?;
    Ok(describe_window(backends.windows.as_ref(), id).unwrap_or_else(|| WindowDescriptor {
        id,
        app_name: id.to_string(),
        title: String::new(),
    }))
}
