//! Terminal utilities

use crate::{LessonError, Result};
use log::debug;
use nix::libc;
use std::os::unix::io::RawFd;

/// Get the terminal size (cols, rows) for the given file descriptor
///
/// Falls back to 80x24 when the size can't be queried.
pub fn get_terminal_size(fd: RawFd) -> Result<(u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };

    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Ok((ws.ws_col, ws.ws_row))
    } else {
        Ok((80, 24))
    }
}

/// Is the file descriptor an interactive terminal?
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

/// Set raw mode on a terminal file descriptor
///
/// Raw mode delivers every keypress immediately, including arrow-key escape
/// sequences and Ctrl+C. Returns the original attributes for restoring.
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let mut original: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
        return Err(LessonError::Terminal(format!(
            "tcgetattr failed: {}",
            std::io::Error::last_os_error()
        )));
    }

    let mut raw = original;
    unsafe {
        libc::cfmakeraw(&mut raw);
        if libc::tcsetattr(fd, libc::TCSANOW, &raw) != 0 {
            return Err(LessonError::Terminal(format!(
                "tcsetattr failed: {}",
                std::io::Error::last_os_error()
            )));
        }
    }

    Ok(original)
}

/// Restore terminal attributes
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}

/// RAII guard that puts the terminal back into its original mode
pub struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl TermiosGuard {
    /// Switch `fd` to raw mode until the guard is dropped
    pub fn raw(fd: RawFd) -> Result<Self> {
        let termios = set_raw_mode(fd)?;
        Ok(Self { fd, termios })
    }
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        restore_termios(self.fd, &self.termios);
        debug!("Terminal attributes restored");
    }
}
