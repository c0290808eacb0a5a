//! Window capture
//!
//! Window enumeration, single-frame capture and interactive region selection.

pub mod region;
pub mod traits;
pub mod window_server;

pub use region::RegionSelector;
pub use traits::{
    describe_window, resolve_identifier, FrameSource, WindowDescriptor, WindowEnumerator, WindowId,
};
pub use window_server::SystemWindows;
