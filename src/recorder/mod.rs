//! Recording system module
//!
//! - `RecordingSession` owns the capture timer and frame buffer
//! - `FrameBuffer` keeps frames in capture order until the drain
//! - `downscale` shrinks each captured frame before it is buffered

pub mod buffer;
pub mod resize;
pub mod session;
pub mod state;

pub use buffer::FrameBuffer;
pub use session::{ControlRequest, RecordingEvent, RecordingSession, SessionHandle};
pub use state::{RecordingConfig, RecordingOutcome, SessionState};
