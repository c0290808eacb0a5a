//! Cross-process coordination
//!
//! Finds another running instance of this program and delivers save/abort
//! signals to it. A failed lookup means "nothing running", never an error.

use crate::utils::{AppError, AppResult};
use std::path::Path;
use std::process::Command;

/// Request sent to a running recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Graceful stop (SIGINT)
    Save,
    /// Discard and exit (SIGTERM)
    Abort,
}

impl ControlSignal {
    #[cfg(unix)]
    fn as_raw(self) -> libc::c_int {
        match self {
            ControlSignal::Save => libc::SIGINT,
            ControlSignal::Abort => libc::SIGTERM,
        }
    }
}

/// Locates and signals other instances
pub trait InstanceCoordinator: Send + Sync {
    /// PID of another live instance, if any
    fn find_other_running_instance_pid(&self) -> Option<u32>;

    /// Deliver `signal` to `pid`
    fn send(&self, pid: u32, signal: ControlSignal) -> AppResult<()>;
}

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub state: String,
    pub command: String,
}

impl ProcessEntry {
    fn is_zombie(&self) -> bool {
        self.state.starts_with('Z')
    }

    /// Executable name without its directory
    fn program_name(&self) -> &str {
        Path::new(&self.command)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.command)
    }
}

/// Parse `ps -axo pid=,stat=,comm=` output
pub fn parse_process_table(output: &str) -> Vec<ProcessEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let pid = fields.next()?.parse().ok()?;
            let state = fields.next()?.to_string();
            // The command itself may contain spaces
            let command = fields.collect::<Vec<_>>().join(" ");
            if command.is_empty() {
                return None;
            }
            Some(ProcessEntry {
                pid,
                state,
                command,
            })
        })
        .collect()
}

/// First live entry named `program` that is not `own_pid`
pub fn find_other_instance(entries: &[ProcessEntry], program: &str, own_pid: u32) -> Option<u32> {
    entries
        .iter()
        .filter(|entry| entry.pid != own_pid && !entry.is_zombie())
        .find(|entry| entry.program_name() == program)
        .map(|entry| entry.pid)
}

/// Coordinator backed by `ps` and `kill(2)`
#[derive(Debug, Clone)]
pub struct ProcessCoordinator {
    program: String,
}

impl Default for ProcessCoordinator {
    fn default() -> Self {
        Self::new(current_program_name())
    }
}

impl ProcessCoordinator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn process_table(&self) -> Option<Vec<ProcessEntry>> {
        let output = Command::new("ps")
            .args(["-axo", "pid=,stat=,comm="])
            .output()
            .map_err(|e| tracing::debug!("Failed to run ps: {}", e))
            .ok()?;

        if !output.status.success() {
            tracing::debug!("ps exited with {}", output.status);
            return None;
        }

        Some(parse_process_table(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl InstanceCoordinator for ProcessCoordinator {
    fn find_other_running_instance_pid(&self) -> Option<u32> {
        let entries = self.process_table()?;
        let pid = find_other_instance(&entries, &self.program, std::process::id());
        tracing::debug!("Other {} instance: {:?}", self.program, pid);
        pid
    }

    #[cfg(unix)]
    fn send(&self, pid: u32, signal: ControlSignal) -> AppResult<()> {
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| AppError::Coordination(format!("Invalid process id {}", pid)))?;

        tracing::info!("Sending {:?} to process {}", signal, pid);
        // SAFETY: kill(2) has no memory-safety preconditions
        let result = unsafe { libc::kill(pid, signal.as_raw()) };
        if result != 0 {
            let error = std::io::Error::last_os_error();
            return Err(AppError::Coordination(format!(
                "Failed to signal process {}: {}",
                pid, error
            )));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn send(&self, pid: u32, signal: ControlSignal) -> AppResult<()> {
        Err(AppError::Coordination(format!(
            "Cannot deliver {:?} to process {} on this platform",
            signal, pid
        )))
    }
}

/// File name of the running executable
pub fn current_program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().to_string()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
