//! `--list`

use super::Backends;
use crate::utils::AppResult;
use std::io::Write;

/// Print the capturable windows, one per line or as a JSON array
pub fn list(backends: &Backends, include_hidden: bool, json: bool, out: &mut dyn Write) -> AppResult<u8> {
    let windows = backends.windows.list_windows(include_hidden)?;
    tracing::debug!("Listing {} windows (hidden: {})", windows.len(), include_hidden);

    if json {
        let body = serde_json::to_string_pretty(&windows).map_err(std::io::Error::from)?;
        writeln!(out, "{}", body)?;
    } else {
        for window in &windows {
            writeln!(out, "{}", window.list_line())?;
        }
    }

    Ok(0)
}
