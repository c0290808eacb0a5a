//! `--version`

use crate::utils::AppResult;
use std::io::Write;

/// Program name and version, e.g. `macosrec 0.3.0`
pub fn version_line() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

pub fn version(out: &mut dyn Write) -> AppResult<u8> {
    writeln!(out, "{}", version_line())?;
    Ok(0)
}
