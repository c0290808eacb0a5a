//! Output path resolution

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Timestamp prefix used in generated file names
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Build `<dir>/<YYYY-MM-DD-HH:mm:ss>-<appName>.<ext>`
pub fn default_output_path(dir: &Path, app_name: &str, extension: &str, now: DateTime<Local>) -> PathBuf {
    // Application names occasionally carry a path separator
    let app_name = app_name.trim().replace('/', "-");
    dir.join(format!(
        "{}-{}.{}",
        now.format(TIMESTAMP_FORMAT),
        app_name,
        extension
    ))
}

/// Lowercased extension of a path, if any
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extension: &str) -> bool {
    extension_of(path).as_deref() == Some(extension)
}

/// Create the parent directory of an output file if it is missing
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            tracing::debug!("Creating output directory {:?}", parent);
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
