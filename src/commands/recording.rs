//! `--record`, `--save` and `--abort`

use super::{target_window, Backends};
use crate::export::ffmpeg::{locate, probe_video, VideoProbe};
use crate::export::{MediaKind, VideoQuality};
use crate::process::ControlSignal;
use crate::recorder::{
    RecordingConfig, RecordingEvent, RecordingOutcome, RecordingSession, SessionHandle,
};
use crate::utils::paths::{default_output_path, ensure_parent_dir};
use crate::utils::{AppError, AppResult};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Validated `--record` arguments
#[derive(Debug, Clone)]
pub struct RecordRequest {
    pub window: String,
    pub kind: MediaKind,
    pub output: Option<PathBuf>,
    pub quality: Option<VideoQuality>,
}

/// Record one window until a save or abort request arrives.
///
/// `listen` wires stop requests to the session before the timer starts. It is
/// given the session handle and an event subscription.
pub async fn record<L>(
    backends: &Backends,
    request: RecordRequest,
    out: &mut dyn Write,
    listen: L,
) -> AppResult<u8>
where
    L: FnOnce(SessionHandle, broadcast::Receiver<RecordingEvent>) -> AppResult<()>,
{
    if let Some(pid) = backends.coordinator.find_other_running_instance_pid() {
        return Err(AppError::Coordination(format!(
            "Another recording is already running (pid {})",
            pid
        )));
    }

    let target = target_window(backends, &request.window)?;

    let mut settings = backends.settings.clone();
    if let Some(quality) = request.quality {
        settings.quality = quality;
    }

    if request.kind == MediaKind::Video {
        let ffmpeg = locate(&settings.ffmpeg)?;
        tracing::debug!("Using encoder {:?}", ffmpeg);
        settings.ffmpeg = ffmpeg.to_string_lossy().to_string();
    }

    let output = request.output.unwrap_or_else(|| {
        default_output_path(
            &settings.output_dir,
            &target.app_name,
            request.kind.extension(),
            Local::now(),
        )
    });
    ensure_parent_dir(&output)?;

    let config = RecordingConfig::new(target, request.kind, output, &settings);
    let session = RecordingSession::new(config, Arc::clone(&backends.frames));

    listen(session.handle(), session.subscribe())?;
    let logger = tokio::spawn(log_events(session.subscribe()));

    let outcome = session.run().await;
    if let Err(e) = logger.await {
        tracing::debug!("Event logger ended abnormally: {}", e);
    }

    match outcome? {
        RecordingOutcome::Saved { path, frames } => {
            tracing::info!("Saved {} frames to {:?}", frames, path);
            if request.kind == MediaKind::Video {
                log_video_probe(&settings.ffprobe, &path);
            }
            writeln!(out, "{}", path.display())?;
            Ok(0)
        }
        RecordingOutcome::Aborted => {
            writeln!(out, "Aborted")?;
            Ok(1)
        }
    }
}

/// Report what ffprobe sees in a freshly written video.
///
/// Missing or failing ffprobe only logs; the recording is already saved.
fn log_video_probe(ffprobe: &str, path: &Path) -> Option<VideoProbe> {
    let program = locate(ffprobe)
        .map_err(|e| tracing::debug!("Skipping video probe: {}", e))
        .ok()?;

    match probe_video(&program.to_string_lossy(), path) {
        Ok(probe) => {
            tracing::info!(
                "{:?}: {}x{}, {} frames at {} fps",
                path,
                probe.width,
                probe.height,
                probe.frame_count,
                probe.fps
            );
            Some(probe)
        }
        Err(e) => {
            tracing::warn!("Failed to probe {:?}: {}", path, e);
            None
        }
    }
}

async fn log_events(mut events: broadcast::Receiver<RecordingEvent>) {
    loop {
        match events.recv().await {
            Ok(RecordingEvent::FrameCaptured(count)) => {
                tracing::debug!("Captured frame {}", count)
            }
            Ok(event) => tracing::info!("Recording event: {:?}", event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Event log skipped {} events", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Route SIGINT to save and SIGTERM to abort.
///
/// Handlers are registered before this returns so a stop request sent right
/// after launch is not lost.
#[cfg(unix)]
pub fn install_signal_listener(
    handle: SessionHandle,
    _events: broadcast::Receiver<RecordingEvent>,
) -> AppResult<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {
                tracing::info!("Interrupt received, saving recording");
                handle.request_save();
            }
            _ = terminate.recv() => {
                tracing::info!("Terminate received, aborting recording");
                handle.request_abort();
            }
        }
    });
    Ok(())
}

/// Ctrl-C saves; there is no abort signal on this platform
#[cfg(not(unix))]
pub fn install_signal_listener(
    handle: SessionHandle,
    _events: broadcast::Receiver<RecordingEvent>,
) -> AppResult<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, saving recording");
            handle.request_save();
        }
    });
    Ok(())
}

/// Deliver `signal` to the running recorder
pub fn signal_running(backends: &Backends, signal: ControlSignal) -> AppResult<u8> {
    let pid = backends
        .coordinator
        .find_other_running_instance_pid()
        .ok_or_else(|| AppError::Coordination("No recording is running".to_string()))?;

    backends.coordinator.send(pid, signal)?;
    Ok(0)
}
