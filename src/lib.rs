//! macosrec - screenshots, window recordings and on-screen text recognition
//! from the command line.
//!
//! The binary is a thin wrapper around [`run`], which parses arguments,
//! dispatches to a command handler and maps the result to an exit status.
//! Everything that touches the OS sits behind the traits collected in
//! [`commands::Backends`].

pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod ocr;
pub mod process;
pub mod recorder;
pub mod utils;

use clap::Parser;
use commands::Backends;
use std::ffi::OsString;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "macosrec=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Parse `args`, run the requested command and return the exit status.
///
/// Command output goes to `out`; errors are written to `err` as
/// `Error: <message>`.
pub async fn run<I, T>(args: I, backends: &Backends, out: &mut dyn Write, err: &mut dyn Write) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            // --help lands here with a success exit code
            if e.exit_code() == 0 {
                let _ = write!(out, "{}", e);
                return 0;
            }
            let _ = write!(err, "{}", e);
            return 1;
        }
    };

    let result = match cli.intent() {
        Ok(intent) => commands::execute(intent, backends, out).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(code = e.code(), "{}", e);
            let _ = writeln!(err, "Error: {}", e);
            1
        }
    }
}
