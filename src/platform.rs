//! Platform detection utilities

use std::fs;
use std::path::Path;

/// Socket that WSLg exposes for PulseAudio clients
pub const WSLG_PULSE_PATH: &str = "/mnt/wslg/PulseServer";

/// Detect if running in WSL (Windows Subsystem for Linux)
///
/// Checks for WSL-specific indicators in /proc/version and environment variables.
pub fn is_wsl() -> bool {
    if let Ok(contents) = fs::read_to_string("/proc/version") {
        let lower = contents.to_lowercase();
        if lower.contains("microsoft") || lower.contains("wsl") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok()
}

/// Locate the PulseAudio server that audio subprocesses should talk to
///
/// Returns `PULSE_SERVER` when it is already set, otherwise the WSLg socket
/// if it exists. `None` means the client library's defaults apply.
pub fn pulse_server() -> Option<String> {
    if let Ok(server) = std::env::var("PULSE_SERVER") {
        return Some(server);
    }

    if Path::new(WSLG_PULSE_PATH).exists() {
        return Some(WSLG_PULSE_PATH.to_string());
    }

    None
}
