//! Window enumeration and capture using the `xcap` crate.
//!
//! This is the infrastructure layer that talks to the OS window server.

use super::traits::{FrameSource, WindowDescriptor, WindowEnumerator, WindowId};
use crate::utils::{AppError, AppResult};
use image::RgbaImage;
use xcap::Window;

/// Raw window record before filtering
#[derive(Debug, Clone)]
struct RawWindow {
    id: WindowId,
    /// `None` when the owning process could not be matched to an application
    app_name: Option<String>,
    title: String,
    on_screen: bool,
}

impl RawWindow {
    fn from_xcap_window(window: &Window) -> Option<Self> {
        let id = match window.id() {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Skipping window without id: {}", e);
                return None;
            }
        };

        let app_name = window
            .app_name()
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Some(Self {
            id,
            app_name,
            title: window.title().unwrap_or_default(),
            on_screen: !window.is_minimized().unwrap_or(false),
        })
    }
}

/// Apply visibility scope and drop windows with no owning application.
/// Order is preserved.
fn select_windows(raw: Vec<RawWindow>, include_hidden: bool) -> Vec<WindowDescriptor> {
    raw.into_iter()
        .filter(|window| include_hidden || window.on_screen)
        .filter_map(|window| {
            let app_name = window.app_name?;
            Some(WindowDescriptor {
                id: window.id,
                app_name,
                title: window.title,
            })
        })
        .collect()
}

/// Window server backed by `xcap`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWindows;

impl SystemWindows {
    pub fn new() -> Self {
        Self
    }

    fn find(&self, id: WindowId) -> Option<Window> {
        match Window::all() {
            Ok(windows) => windows.into_iter().find(|w| w.id().ok() == Some(id)),
            Err(e) => {
                tracing::warn!("Failed to enumerate windows: {}", e);
                None
            }
        }
    }
}

impl WindowEnumerator for SystemWindows {
    fn list_windows(&self, include_hidden: bool) -> AppResult<Vec<WindowDescriptor>> {
        let windows = Window::all()
            .map_err(|e| AppError::CaptureFailure(format!("Failed to enumerate windows: {}", e)))?;

        let raw = windows.iter().filter_map(RawWindow::from_xcap_window).collect();
        let selected = select_windows(raw, include_hidden);

        tracing::debug!(
            "Enumerated {} windows (include_hidden={})",
            selected.len(),
            include_hidden
        );
        Ok(selected)
    }
}

impl FrameSource for SystemWindows {
    fn capture_window_image(&self, id: WindowId) -> Option<RgbaImage> {
        let window = self.find(id)?;
        match window.capture_image() {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!("Failed to capture window {}: {}", id, e);
                None
            }
        }
    }
}
