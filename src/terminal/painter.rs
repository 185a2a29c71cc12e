//! Paints rendered frames onto the terminal

use crate::ui::Frame;
use crate::Result;
use std::io::Write;

/// Clear screen and home the cursor
const CLEAR: &str = "\x1b[2J\x1b[H";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Writes frames to an output, redrawing the whole screen each time
pub struct Painter<W: Write> {
    out: W,
}

impl<W: Write> Painter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(HIDE_CURSOR.as_bytes())?;
        Ok(Self { out })
    }

    /// Replace the screen contents with `frame`
    ///
    /// Lines end in CRLF since raw mode disables output post-processing.
    pub fn paint(&mut self, frame: &Frame) -> Result<()> {
        let mut buf = String::from(CLEAR);
        for line in &frame.lines {
            buf.push_str(line);
            buf.push_str("\r\n");
        }
        self.out.write_all(buf.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for Painter<W> {
    fn drop(&mut self) {
        let _ = self.out.write_all(SHOW_CURSOR.as_bytes());
        let _ = self.out.flush();
    }
}
