//! Recording session
//!
//! Owns the capture timer and the frame buffer and drives the
//! `Idle -> Capturing -> Finalizing -> Done` lifecycle. Stop requests arrive
//! through a [`SessionHandle`] instead of touching session state directly, so
//! signal handlers only ever post a message.

use super::buffer::FrameBuffer;
use super::resize::downscale;
use super::state::{RecordingConfig, RecordingOutcome, SessionState};
use crate::capture::FrameSource;
use crate::export::{export_frames, EncodeError, ExportOptions};
use crate::utils::{AppError, AppResult};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingEvent {
    /// Timer started
    Started,
    /// A frame was buffered (running total)
    FrameCaptured(usize),
    /// Timer stopped, encoding or discarding
    Finalizing,
    /// Output written
    Saved(PathBuf),
    /// Buffer discarded
    Aborted,
}

/// Terminal request for a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Encode buffered frames and write the output
    Save,
    /// Discard buffered frames
    Abort,
}

/// Cloneable sender for stop requests
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<ControlRequest>,
}

impl SessionHandle {
    /// Ask the session to encode and exit. Returns false if it already ended.
    pub fn request_save(&self) -> bool {
        self.tx.send(ControlRequest::Save).is_ok()
    }

    /// Ask the session to discard and exit. Returns false if it already ended.
    pub fn request_abort(&self) -> bool {
        self.tx.send(ControlRequest::Abort).is_ok()
    }
}

/// A single recording of one window
pub struct RecordingSession {
    config: RecordingConfig,
    source: Arc<dyn FrameSource>,
    state: Arc<RwLock<SessionState>>,
    buffer: FrameBuffer,
    control_rx: mpsc::UnboundedReceiver<ControlRequest>,
    handle: SessionHandle,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl RecordingSession {
    /// Create an idle session
    pub fn new(config: RecordingConfig, source: Arc<dyn FrameSource>) -> Self {
        let (tx, control_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(100);
        Self {
            config,
            source,
            state: Arc::new(RwLock::new(SessionState::Idle)),
            buffer: FrameBuffer::new(),
            control_rx,
            handle: SessionHandle { tx },
            event_tx,
        }
    }

    /// Handle for delivering save/abort requests
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Get the current session state
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    /// Number of buffered frames
    pub fn frame_count(&self) -> usize {
        self.buffer.len()
    }

    fn transition(&self, next: SessionState) -> AppResult<()> {
        let mut state = self.state.write();
        if !state.can_transition_to(next) {
            return Err(AppError::InvalidArgument(format!(
                "Recording cannot move from {:?} to {:?}",
                *state, next
            )));
        }
        tracing::debug!("Recording state {:?} -> {:?}", *state, next);
        *state = next;
        Ok(())
    }

    /// Enter `Capturing`
    pub fn start(&mut self) -> AppResult<()> {
        self.transition(SessionState::Capturing)?;
        let _ = self.event_tx.send(RecordingEvent::Started);

        tracing::info!(
            "Recording window {} ({}) at {} fps to {:?}",
            self.config.target.id,
            self.config.target.app_name,
            self.config.fps,
            self.config.output
        );
        Ok(())
    }

    /// Capture one frame, downscale it and append it to the buffer.
    ///
    /// Capture and resize run on the blocking pool but are awaited here, so
    /// ticks never overlap.
    pub async fn tick(&mut self) -> AppResult<()> {
        if self.state() != SessionState::Capturing {
            return Err(AppError::InvalidArgument(
                "Recording is not capturing".to_string(),
            ));
        }

        let id = self.config.target.id;
        let factor = self.config.downscale;
        let source = Arc::clone(&self.source);
        let resized = tokio::task::spawn_blocking(move || {
            let frame = source.capture_window_image(id).ok_or_else(|| {
                AppError::CaptureFailure(format!("Window {} could not be captured", id))
            })?;
            downscale(frame, factor)
                .map_err(|e| AppError::CaptureFailure(format!("Failed to resize frame: {}", e)))
        })
        .await
        .map_err(|e| AppError::CaptureFailure(format!("Capture task failed: {}", e)))??;

        self.buffer.push(resized);
        let count = self.buffer.len();
        tracing::trace!("Buffered frame {}", count);
        let _ = self.event_tx.send(RecordingEvent::FrameCaptured(count));
        Ok(())
    }

    /// Drain the buffer into the encoder and write the output
    pub async fn finalize(mut self) -> AppResult<RecordingOutcome> {
        self.transition(SessionState::Finalizing)?;
        let _ = self.event_tx.send(RecordingEvent::Finalizing);

        let buffer = std::mem::take(&mut self.buffer);
        if buffer.is_empty() {
            self.mark_done();
            return Err(AppError::NoFrames);
        }

        let options: ExportOptions = self.config.export_options();
        let frames = buffer.drain();
        tracing::info!("Encoding {} frames", frames.len());

        let encode_options = options.clone();
        let result =
            tokio::task::spawn_blocking(move || export_frames(frames, &encode_options)).await;

        self.mark_done();
        let frames = result.map_err(encoder_task_failed)??;

        let _ = self
            .event_tx
            .send(RecordingEvent::Saved(options.output_path.clone()));
        Ok(RecordingOutcome::Saved {
            path: options.output_path,
            frames,
        })
    }

    /// Stop and throw away the buffer
    pub fn abort(mut self) -> AppResult<RecordingOutcome> {
        self.transition(SessionState::Finalizing)?;
        let discarded = std::mem::take(&mut self.buffer).len();
        tracing::info!("Recording aborted, discarded {} frames", discarded);

        self.mark_done();
        let _ = self.event_tx.send(RecordingEvent::Aborted);
        Ok(RecordingOutcome::Aborted)
    }

    fn mark_done(&self) {
        if let Err(e) = self.transition(SessionState::Done) {
            tracing::warn!("{}", e);
        }
    }

    /// Record until a save or abort request arrives.
    ///
    /// The first capture happens one interval after start. Ticks are delayed,
    /// never dropped, when a capture runs long.
    pub async fn run(mut self) -> AppResult<RecordingOutcome> {
        self.start()?;

        let interval = self.config.frame_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let request = loop {
            tokio::select! {
                biased;
                request = self.control_rx.recv() => {
                    break request.unwrap_or(ControlRequest::Save);
                }
                _ = ticker.tick() => {
                    self.tick().await?;
                }
            }
        };

        // No captures once the timer is gone
        drop(ticker);
        tracing::info!("Received {:?} after {} frames", request, self.buffer.len());

        match request {
            ControlRequest::Save => self.finalize().await,
            ControlRequest::Abort => self.abort(),
        }
    }
}

/// A panicked or cancelled encoder task is an encode failure
fn encoder_task_failed(error: tokio::task::JoinError) -> AppError {
    AppError::Encode(EncodeError::Encoding(format!("Encoder task failed: {}", error)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{WindowDescriptor, WindowId};
    use crate::config::Settings;
    use crate::export::MediaKind;
    use image::{Rgba, RgbaImage};
    use parking_lot::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Returns a differently coloured frame on each call
    struct SequenceSource {
        calls: Mutex<u8>,
        available: bool,
    }

    impl SequenceSource {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
                available: true,
            }
        }

        fn gone() -> Self {
            Self {
                calls: Mutex::new(0),
                available: false,
            }
        }
    }

    impl FrameSource for SequenceSource {
        fn capture_window_image(&self, _id: WindowId) -> Option<RgbaImage> {
            if !self.available {
                return None;
            }
            let mut calls = self.calls.lock();
            *calls = calls.wrapping_add(1);
            Some(RgbaImage::from_pixel(10, 10, Rgba([calls.wrapping_mul(40), 0, 0, 255])))
        }
    }

    fn config(kind: MediaKind, output: PathBuf) -> RecordingConfig {
        let target = WindowDescriptor {
            id: 123,
            app_name: "Emacs".to_string(),
            title: String::new(),
        };
        RecordingConfig::new(target, kind, output, &Settings::default())
    }

    #[tokio::test]
    async fn test_tick_buffers_downscaled_frames() {
        let dir = tempdir().unwrap();
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, dir.path().join("a.gif")),
            Arc::new(SequenceSource::new()),
        );
        session.start().unwrap();
        session.tick().await.unwrap();
        session.tick().await.unwrap();

        assert_eq!(session.frame_count(), 2);
        assert_eq!(session.buffer.drain()[0].dimensions(), (7, 7));
    }

    #[tokio::test]
    async fn test_tick_before_start_is_rejected() {
        let dir = tempdir().unwrap();
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, dir.path().join("a.gif")),
            Arc::new(SequenceSource::new()),
        );
        assert!(session.tick().await.is_err());
        assert_eq!(session.frame_count(), 0);
    }

    #[tokio::test]
    async fn test_capture_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, dir.path().join("a.gif")),
            Arc::new(SequenceSource::gone()),
        );
        session.start().unwrap();
        assert!(matches!(session.tick().await, Err(AppError::CaptureFailure(_))));
    }

    #[tokio::test]
    async fn test_finalize_with_no_frames() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.gif");
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, output.clone()),
            Arc::new(SequenceSource::new()),
        );
        session.start().unwrap();

        assert!(matches!(session.finalize().await, Err(AppError::NoFrames)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_finalize_writes_gif() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.gif");
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, output.clone()),
            Arc::new(SequenceSource::new()),
        );
        let state = session.state.clone();
        session.start().unwrap();
        for _ in 0..3 {
            session.tick().await.unwrap();
        }

        let outcome = session.finalize().await.unwrap();
        assert_eq!(
            outcome,
            RecordingOutcome::Saved {
                path: output.clone(),
                frames: 3
            }
        );
        assert!(output.is_file());
        assert_eq!(*state.read(), SessionState::Done);
    }

    #[tokio::test]
    async fn test_abort_discards_frames() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.gif");
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, output.clone()),
            Arc::new(SequenceSource::new()),
        );
        session.start().unwrap();
        session.tick().await.unwrap();

        assert_eq!(session.abort().unwrap(), RecordingOutcome::Aborted);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_save_before_first_tick_has_no_frames() {
        let dir = tempdir().unwrap();
        let session = RecordingSession::new(
            config(MediaKind::Animated, dir.path().join("a.gif")),
            Arc::new(SequenceSource::new()),
        );
        assert!(session.handle().request_save());

        let result = session.run().await;
        assert!(matches!(result, Err(AppError::NoFrames)));
    }

    #[tokio::test]
    async fn test_abort_request_ends_run() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.gif");
        let session = RecordingSession::new(
            config(MediaKind::Animated, output.clone()),
            Arc::new(SequenceSource::new()),
        );
        session.handle().request_abort();

        assert_eq!(session.run().await.unwrap(), RecordingOutcome::Aborted);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_save_after_three_ticks() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.gif");
        let session = RecordingSession::new(
            config(MediaKind::Animated, output.clone()),
            Arc::new(SequenceSource::new()),
        );
        let handle = session.handle();
        let mut events = session.subscribe();
        let task = tokio::spawn(session.run());

        let waited = tokio::time::timeout(Duration::from_secs(10), async {
            while let Ok(event) = events.recv().await {
                if event == RecordingEvent::FrameCaptured(3) {
                    handle.request_save();
                    break;
                }
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for three frames");

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(
            outcome,
            RecordingOutcome::Saved {
                path: output,
                frames: 3
            }
        );
    }

    /// Records which thread each capture ran on
    struct ThreadRecordingSource {
        threads: Mutex<Vec<std::thread::ThreadId>>,
    }

    impl FrameSource for ThreadRecordingSource {
        fn capture_window_image(&self, _id: WindowId) -> Option<RgbaImage> {
            self.threads.lock().push(std::thread::current().id());
            Some(RgbaImage::new(10, 10))
        }
    }

    #[tokio::test]
    async fn test_capture_runs_off_the_runtime_thread() {
        let dir = tempdir().unwrap();
        let source = Arc::new(ThreadRecordingSource {
            threads: Mutex::new(Vec::new()),
        });
        let mut session = RecordingSession::new(
            config(MediaKind::Animated, dir.path().join("a.gif")),
            source.clone(),
        );
        session.start().unwrap();
        session.tick().await.unwrap();

        let runtime_thread = std::thread::current().id();
        let threads = source.threads.lock();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], runtime_thread);
    }

    #[tokio::test]
    async fn test_panicked_encoder_task_is_an_encode_error() {
        let join_error = tokio::task::spawn_blocking(|| panic!("encoder crashed"))
            .await
            .unwrap_err();
        let error = encoder_task_failed(join_error);
        assert_eq!(error.code(), "ENCODE_ERROR");
    }

    #[tokio::test]
    async fn test_failed_encode_still_ends_done() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.mov");
        let target = WindowDescriptor {
            id: 123,
            app_name: "Emacs".to_string(),
            title: String::new(),
        };
        let settings = Settings {
            ffmpeg: "macosrec-no-such-ffmpeg".to_string(),
            ..Settings::default()
        };
        let mut session = RecordingSession::new(
            RecordingConfig::new(target, MediaKind::Video, output.clone(), &settings),
            Arc::new(SequenceSource::new()),
        );
        let state = session.state.clone();
        session.start().unwrap();
        session.tick().await.unwrap();

        assert!(matches!(session.finalize().await, Err(AppError::Encode(_))));
        assert_eq!(*state.read(), SessionState::Done);
        assert!(!output.exists());
    }
}
