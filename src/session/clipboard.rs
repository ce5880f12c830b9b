use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::core::error::ClipboardError;
use crate::core::traits::Clipboard;

/// Copies through the terminal with an OSC 52 escape sequence. Works over SSH
/// as long as the terminal emulator honours OSC 52.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let encoded = STANDARD.encode(text.as_bytes());
        write!(self.out, "\x1b]52;c;{encoded}\x07")?;
        self.out.flush()?;
        Ok(())
    }
}
