//! Capture trait definitions
//!
//! Platform-agnostic seams for window enumeration and single-frame capture.

use crate::utils::{AppError, AppResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// OS-assigned window handle
pub type WindowId = u32;

/// A capturable window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDescriptor {
    /// Window identifier
    pub id: WindowId,

    /// Owning application name
    pub app_name: String,

    /// Window title (may be empty)
    pub title: String,
}

impl WindowDescriptor {
    /// `<id> <app>` or `<id> <app> - <title>`
    pub fn list_line(&self) -> String {
        if self.title.is_empty() {
            format!("{} {}", self.id, self.app_name)
        } else {
            format!("{} {} - {}", self.id, self.app_name, self.title)
        }
    }
}

/// Lists windows known to the window server
pub trait WindowEnumerator: Send + Sync {
    /// Windows in OS order. On-screen only unless `include_hidden` is set.
    fn list_windows(&self, include_hidden: bool) -> AppResult<Vec<WindowDescriptor>>;
}

/// Captures a still image of one window
pub trait FrameSource: Send + Sync {
    /// `None` when the window is gone or capture was refused
    fn capture_window_image(&self, id: WindowId) -> Option<RgbaImage>;
}

/// Resolve user input to a window identifier.
///
/// Numeric input is taken as-is without checking that the window exists.
/// Anything else is matched case-insensitively against the application names
/// of on-screen windows, first match in enumeration order wins.
pub fn resolve_identifier(enumerator: &dyn WindowEnumerator, input: &str) -> AppResult<WindowId> {
    let needle = input.trim();
    if let Ok(id) = needle.parse::<WindowId>() {
        return Ok(id);
    }

    let needle = needle.to_lowercase();
    enumerator
        .list_windows(false)?
        .into_iter()
        .find(|window| window.app_name.trim().to_lowercase() == needle)
        .map(|window| window.id)
        .ok_or_else(|| AppError::InvalidWindowReference(input.trim().to_string()))
}

/// Best-effort descriptor lookup, used to name generated output files
pub fn describe_window(enumerator: &dyn WindowEnumerator, id: WindowId) -> Option<WindowDescriptor> {
    match enumerator.list_windows(true) {
        Ok(windows) => windows.into_iter().find(|window| window.id == id),
        Err(e) => {
            tracing::warn!("Failed to enumerate windows: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedWindows(Vec<WindowDescriptor>);

    impl WindowEnumerator for FixedWindows {
        fn list_windows(&self, _include_hidden: bool) -> AppResult<Vec<WindowDescriptor>> {
            Ok(self.0.clone())
        }
    }

    fn window(id: WindowId, app_name: &str, title: &str) -> WindowDescriptor {
        WindowDescriptor {
            id,
            app_name: app_name.to_string(),
            title: title.to_string(),
        }
    }

    fn fixture() -> FixedWindows {
        FixedWindows(vec![
            window(41, "Terminal", "zsh"),
            window(7, "Emacs", "init.el"),
            window(9, "Emacs", "scratch"),
        ])
    }

    #[test]
    fn test_numeric_input_skips_lookup() {
        assert_eq!(resolve_identifier(&fixture(), "123").unwrap(), 123);
        assert_eq!(resolve_identifier(&fixture(), " 41 ").unwrap(), 41);
    }

    #[test]
    fn test_name_match_is_trimmed_and_case_insensitive() {
        let windows = fixture();
        let padded = resolve_identifier(&windows, " Emacs ").unwrap();
        let lower = resolve_identifier(&windows, "emacs").unwrap();
        assert_eq!(padded, lower);
        // First match in enumeration order
        assert_eq!(padded, 7);
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let result = resolve_identifier(&fixture(), "Safari");
        assert!(matches!(result, Err(AppError::InvalidWindowReference(name)) if name == "Safari"));
    }

    #[test]
    fn test_list_line() {
        assert_eq!(window(7, "Emacs", "").list_line(), "7 Emacs");
        assert_eq!(window(7, "Emacs", "init.el").list_line(), "7 Emacs - init.el");
    }
}
